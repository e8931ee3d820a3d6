/// Password-reset token model and database operations
///
/// At most one token exists per user: `user_id` carries a unique
/// constraint, and [`PasswordResetToken::create`] uses
/// `ON CONFLICT DO NOTHING` so a concurrent second request can never insert
/// a second row. Tokens are deleted on consumption or when discovered
/// expired; there is no background sweep.
///
/// The token value is stored in the clear because a repeat request resends
/// the stored token rather than minting a new one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE password_reset_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token TEXT NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT password_reset_tokens_user_id_key UNIQUE (user_id)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored password-reset token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordResetToken {
    /// Token record ID
    pub id: Uuid,

    /// Owning user (unique: one token per user)
    pub user_id: Uuid,

    /// Opaque token value (32 random bytes, hex-encoded), never serialized
    #[serde(skip_serializing)]
    pub token: String,

    /// Instant after which the token is no longer valid
    pub expires_at: DateTime<Utc>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

/// Input for issuing a new reset token
#[derive(Debug, Clone)]
pub struct NewResetToken {
    /// Owning user
    pub user_id: Uuid,

    /// Opaque token value
    pub token: String,

    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether the token has passed its expiry at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Inserts a token for a user that has none
    ///
    /// Returns `None` when a token already exists for the user (a
    /// concurrent request won the insert); the caller should reload and
    /// resend the winning token.
    pub async fn create(pool: &PgPool, data: NewResetToken) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, token, expires_at, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.token)
        .bind(data.expires_at)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Finds the token for a user, if any
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM password_reset_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Finds a token record by its opaque value
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM password_reset_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Deletes a token record by ID
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
