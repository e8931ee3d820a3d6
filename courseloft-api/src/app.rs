/// Application state and router
///
/// `AppState` bundles the stores and the three domain services; handlers
/// reach everything through it. The router mounts the public endpoints
/// (health, auth, password reset) and a JWT-protected group (courses,
/// content, enrollment). `/enrollment` and `/subscription` are two mounts
/// of the same membership handlers.
use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::security::SecurityHeadersLayer;
use crate::routes;
use axum::extract::{Request, State};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::Duration;
use courseloft_shared::admission::AdmissionControl;
use courseloft_shared::auth::middleware::authenticate;
use courseloft_shared::catalog::CourseCatalog;
use courseloft_shared::recovery::{LogMailer, Mailer, PasswordResetService, WebhookMailer};
use courseloft_shared::store::Stores;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub admission: Arc<AdmissionControl>,
    pub recovery: Arc<PasswordResetService>,
    pub catalog: Arc<CourseCatalog>,
    /// Pool handle for health reporting; `None` when running on in-memory
    /// stores
    pub db: Option<PgPool>,
    jwt_secret: Arc<str>,
}

impl AppState {
    /// Builds the state from configuration, choosing the mailer from
    /// `MAIL_WEBHOOK_URL`
    pub fn new(stores: Stores, config: &Config) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.mail.webhook_url {
            Some(url) => Arc::new(WebhookMailer::new(url.clone(), config.mail.sender.clone())),
            None => Arc::new(LogMailer),
        };
        Self::with_mailer(
            stores,
            &config.jwt.secret,
            Duration::minutes(config.reset.ttl_minutes),
            mailer,
        )
    }

    /// Builds the state with an explicit mailer and reset TTL
    pub fn with_mailer(
        stores: Stores,
        jwt_secret: &str,
        reset_ttl: Duration,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let admission = Arc::new(AdmissionControl::new(
            stores.courses.clone(),
            stores.memberships.clone(),
        ));
        let recovery = Arc::new(PasswordResetService::with_ttl(
            stores.users.clone(),
            stores.reset_tokens.clone(),
            mailer,
            reset_ttl,
        ));
        let catalog = Arc::new(CourseCatalog::new(
            stores.courses.clone(),
            stores.content.clone(),
        ));

        Self {
            stores,
            admission,
            recovery,
            catalog,
            db: None,
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    /// Attaches the connection pool used for health reporting
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }

    /// Secret used to sign and validate JWTs
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

/// Authenticates the request and stashes the caller identity in the
/// request extensions
async fn jwt_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(request.headers(), state.jwt_secret())?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Builds the full application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/courses", post(routes::courses::create_course))
        .route("/courses/:course_id", get(routes::courses::get_course))
        .route(
            "/courses/:course_id/content",
            post(routes::courses::create_content).get(routes::courses::list_content),
        )
        .route(
            "/enrollment/:course_id/create",
            post(routes::enrollment::join),
        )
        .route(
            "/enrollment/:course_id/delete",
            delete(routes::enrollment::leave),
        )
        .route(
            "/subscription/:course_id/create",
            post(routes::enrollment::join),
        )
        .route(
            "/subscription/:course_id/delete",
            delete(routes::enrollment::leave),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route(
            "/reset-password/send-email",
            post(routes::reset_password::send_email),
        )
        .route("/reset-password", put(routes::reset_password::reset))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(SecurityHeadersLayer::new(false))
        .with_state(state)
}
