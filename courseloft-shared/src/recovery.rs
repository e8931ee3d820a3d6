/// Password-reset token lifecycle
///
/// Issues, resends, expires, and consumes reset tokens. Per user the token
/// moves through `NONE -> ACTIVE` on issuance, then either `-> CONSUMED ->
/// NONE` on a successful reset or `-> EXPIRED -> NONE` lazily, the next
/// time the record is read after its TTL elapsed. There is no background
/// sweep; expiry is detected opportunistically.
///
/// Rules the service guarantees:
///
/// - at most one token row per user (the store refuses a second insert)
/// - the token is generated exactly once and the same value is persisted
///   and mailed
/// - a token is single-use: it is deleted before the password write, so
///   the outcome of the write cannot resurrect it
/// - mail delivery is fire-and-forget: a send failure is logged, the
///   request still succeeds
use crate::auth::password::{self, PasswordError};
use crate::models::NewResetToken;
use crate::store::{ResetTokenStore, StoreError, UserStore};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;

/// Canonical reset-token TTL
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 15;

/// Raw entropy per token before hex encoding
pub const RESET_TOKEN_BYTES: usize = 32;

/// Error type for the reset lifecycle
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// No account for the given email
    #[error("user not found")]
    UserNotFound,

    /// No token record matches the given value
    #[error("reset token not found")]
    TokenNotFound,

    /// The token passed its TTL; the caller must start over
    #[error("reset token expired, make the process again")]
    TokenExpired,

    /// Hashing the replacement password failed
    #[error(transparent)]
    Hash(#[from] PasswordError),

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Outbound notifier for reset emails
///
/// Delivery correctness is out of scope for this crate; implementations
/// only need to hand the token off to whatever actually sends mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_email(&self, to: &str, token: &str) -> Result<(), MailError>;
}

/// Mailer that only logs, for development and tests
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_email(&self, to: &str, _token: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, "password reset email (log mailer, not delivered)");
        Ok(())
    }
}

/// Mailer that POSTs to a mail-provider webhook
pub struct WebhookMailer {
    client: reqwest::Client,
    endpoint: String,
    sender: String,
}

impl WebhookMailer {
    pub fn new(endpoint: String, sender: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            sender,
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send_reset_email(&self, to: &str, token: &str) -> Result<(), MailError> {
        let body = serde_json::json!({
            "from": self.sender,
            "to": to,
            "template": "password-reset",
            "token": token,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Delivery(format!(
                "mail webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// What a reset request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    /// A fresh token was issued and mailed
    Issued,

    /// An unexpired token already existed; it was mailed again
    Resent,
}

/// Generates one opaque reset token: 32 bytes of OS randomness, hex-encoded
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Password-reset service
pub struct PasswordResetService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn ResetTokenStore>,
    mailer: Arc<dyn Mailer>,
    ttl: Duration,
}

impl PasswordResetService {
    /// Creates the service with the canonical 15-minute TTL
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn ResetTokenStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self::with_ttl(users, tokens, mailer, Duration::minutes(DEFAULT_RESET_TTL_MINUTES))
    }

    /// Creates the service with a custom TTL
    pub fn with_ttl(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn ResetTokenStore>,
        mailer: Arc<dyn Mailer>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            ttl,
        }
    }

    /// Requests a reset for the account behind `email`
    ///
    /// An unexpired existing token is resent unchanged; an expired one is
    /// deleted and replaced. Losing the insert to a concurrent request
    /// degrades to resending whichever token won.
    ///
    /// # Errors
    ///
    /// [`RecoveryError::UserNotFound`] when no account matches.
    pub async fn request_reset(&self, email: &str) -> Result<ResetRequestOutcome, RecoveryError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(RecoveryError::UserNotFound)?;

        let now = Utc::now();
        if let Some(existing) = self.tokens.find_by_user(user.id).await? {
            if !existing.is_expired(now) {
                self.send(&user.email, &existing.token).await;
                return Ok(ResetRequestOutcome::Resent);
            }
            // Lazy expiry: drop the stale row and fall through to issuance
            self.tokens.delete(existing.id).await?;
        }

        let token = generate_reset_token();
        let created = self
            .tokens
            .create(NewResetToken {
                user_id: user.id,
                token: token.clone(),
                expires_at: now + self.ttl,
            })
            .await?;

        match created {
            Some(record) => {
                tracing::info!(user_id = %user.id, expires_at = %record.expires_at, "reset token issued");
                self.send(&user.email, &token).await;
                Ok(ResetRequestOutcome::Issued)
            }
            None => {
                // A concurrent request inserted first; resend its token
                match self.tokens.find_by_user(user.id).await? {
                    Some(winner) => {
                        self.send(&user.email, &winner.token).await;
                        Ok(ResetRequestOutcome::Resent)
                    }
                    None => {
                        tracing::warn!(user_id = %user.id, "reset token vanished between insert and reload");
                        Ok(ResetRequestOutcome::Resent)
                    }
                }
            }
        }
    }

    /// Consumes `token` and installs `new_password`
    ///
    /// The token record is deleted before the password write; a token is
    /// single-use regardless of how the write turns out.
    ///
    /// # Errors
    ///
    /// - [`RecoveryError::TokenNotFound`] — unknown (or already consumed) token
    /// - [`RecoveryError::TokenExpired`] — past TTL; the record is deleted
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), RecoveryError> {
        let record = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or(RecoveryError::TokenNotFound)?;

        if record.is_expired(Utc::now()) {
            self.tokens.delete(record.id).await?;
            return Err(RecoveryError::TokenExpired);
        }

        let password_hash = password::hash_password(new_password)?;

        self.tokens.delete(record.id).await?;

        let updated = self
            .users
            .update_password(record.user_id, &password_hash)
            .await?;
        if !updated {
            return Err(RecoveryError::UserNotFound);
        }

        tracing::info!(user_id = %record.user_id, "password reset completed");
        Ok(())
    }

    async fn send(&self, to: &str, token: &str) {
        if let Err(e) = self.mailer.send_reset_email(to, token).await {
            // Token persistence is decoupled from delivery; the user can
            // re-request and get the same token resent.
            tracing::warn!(to = %to, error = %e, "failed to send password reset email");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateUser;
    use crate::store::Stores;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// Mailer that records every (recipient, token) pair it is handed
    #[derive(Default)]
    struct CaptureMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Mailer for CaptureMailer {
        async fn send_reset_email(&self, to: &str, token: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), token.to_string()));
            Ok(())
        }
    }

    /// Mailer whose provider is permanently down
    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send_reset_email(&self, _to: &str, _token: &str) -> Result<(), MailError> {
            Err(MailError::Delivery("provider outage".to_string()))
        }
    }

    struct Harness {
        stores: Stores,
        mailer: Arc<CaptureMailer>,
        service: PasswordResetService,
        user_id: Uuid,
    }

    async fn setup() -> Harness {
        let stores = Stores::memory();
        let mailer = Arc::new(CaptureMailer::default());
        let user = stores
            .users
            .create(CreateUser {
                email: "student@example.com".to_string(),
                password_hash: password::hash_password("old-password-1").unwrap(),
                name: None,
            })
            .await
            .unwrap();
        let service = PasswordResetService::new(
            stores.users.clone(),
            stores.reset_tokens.clone(),
            mailer.clone(),
        );
        Harness {
            stores,
            mailer,
            service,
            user_id: user.id,
        }
    }

    /// Inserts a token that expired in the past, bypassing the service
    async fn insert_expired_token(h: &Harness) -> String {
        let token = generate_reset_token();
        h.stores
            .reset_tokens
            .create(NewResetToken {
                user_id: h.user_id,
                token: token.clone(),
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap()
            .unwrap();
        token
    }

    #[tokio::test]
    async fn test_request_for_unknown_email_is_not_found() {
        let h = setup().await;
        let err = h
            .service
            .request_reset("nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, RecoveryError::UserNotFound));
        assert!(h.mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_issuance_mails_exactly_the_stored_token() {
        let h = setup().await;
        let outcome = h.service.request_reset("student@example.com").await.unwrap();
        assert_eq!(outcome, ResetRequestOutcome::Issued);

        let stored = h
            .stores
            .reset_tokens
            .find_by_user(h.user_id)
            .await
            .unwrap()
            .unwrap();
        let sent = h.mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "student@example.com");
        assert_eq!(sent[0].1, stored.token);
        // 32 bytes hex-encoded
        assert_eq!(stored.token.len(), RESET_TOKEN_BYTES * 2);
    }

    #[tokio::test]
    async fn test_repeat_request_resends_without_a_second_row() {
        let h = setup().await;
        h.service.request_reset("student@example.com").await.unwrap();
        let first = h
            .stores
            .reset_tokens
            .find_by_user(h.user_id)
            .await
            .unwrap()
            .unwrap();

        let outcome = h.service.request_reset("student@example.com").await.unwrap();
        assert_eq!(outcome, ResetRequestOutcome::Resent);

        let second = h
            .stores
            .reset_tokens
            .find_by_user(h.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.token, second.token);

        let sent = h.mailer.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, sent[1].1);
    }

    #[tokio::test]
    async fn test_expired_token_is_replaced_on_next_request() {
        let h = setup().await;
        let stale = insert_expired_token(&h).await;

        let outcome = h.service.request_reset("student@example.com").await.unwrap();
        assert_eq!(outcome, ResetRequestOutcome::Issued);

        let fresh = h
            .stores
            .reset_tokens
            .find_by_user(h.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(fresh.token, stale);
        assert!(!fresh.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_reset_consumes_token_and_changes_password() {
        let h = setup().await;
        h.service.request_reset("student@example.com").await.unwrap();
        let token = h.mailer.sent.lock().await[0].1.clone();

        h.service
            .reset_password(&token, "new-password-1")
            .await
            .unwrap();

        let user = h
            .stores
            .users
            .find_by_id(h.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(password::verify_password("new-password-1", &user.password_hash).unwrap());
        assert!(!password::verify_password("old-password-1", &user.password_hash).unwrap());

        // Single use: the record is gone
        let err = h
            .service
            .reset_password(&token, "another-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RecoveryError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_expired_token_is_deleted_on_consumption_attempt() {
        let h = setup().await;
        let token = insert_expired_token(&h).await;

        let err = h
            .service
            .reset_password(&token, "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RecoveryError::TokenExpired));

        // Deleted on discovery, so the retry sees nothing
        let err = h
            .service
            .reset_password(&token, "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RecoveryError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let h = setup().await;
        let err = h
            .service
            .reset_password(&"f".repeat(64), "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RecoveryError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_mail_outage_does_not_block_issuance() {
        let stores = Stores::memory();
        let user = stores
            .users
            .create(CreateUser {
                email: "student@example.com".to_string(),
                password_hash: password::hash_password("old-password-1").unwrap(),
                name: None,
            })
            .await
            .unwrap();
        let service = PasswordResetService::new(
            stores.users.clone(),
            stores.reset_tokens.clone(),
            Arc::new(FailingMailer),
        );

        let outcome = service.request_reset("student@example.com").await.unwrap();
        assert_eq!(outcome, ResetRequestOutcome::Issued);
        assert!(stores
            .reset_tokens
            .find_by_user(user.id)
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_generated_tokens_are_unique_and_sized() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), RESET_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
