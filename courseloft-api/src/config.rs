/// API server configuration
///
/// Loaded from environment variables (a `.env` file is honored in
/// development via dotenvy).
///
/// # Environment Variables
///
/// - `API_HOST`: bind address (default: 127.0.0.1)
/// - `API_PORT`: bind port (default: 8080)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `RESET_TOKEN_TTL_MINUTES`: reset-token lifetime (default: 15)
/// - `MAIL_WEBHOOK_URL`: mail-provider webhook; unset means log-only mail
/// - `MAIL_SENDER`: From address for reset emails (default: no-reply@courseloft.dev)
/// - `RUST_LOG`: log filter
use courseloft_shared::recovery::DEFAULT_RESET_TTL_MINUTES;
use std::env;

/// HTTP bind settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

/// Database pool settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

/// Outbound mail settings
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Webhook endpoint; `None` falls back to the log-only mailer
    pub webhook_url: Option<String>,
    pub sender: String,
}

/// Password-reset settings
#[derive(Debug, Clone)]
pub struct ResetSettings {
    pub ttl_minutes: i64,
}

/// Complete API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub mail: MailSettings,
    pub reset: ResetSettings,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` or `JWT_SECRET` is missing,
    /// when the secret is shorter than 32 characters, or when a numeric
    /// variable fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters");
        }

        let ttl_minutes = env::var("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| DEFAULT_RESET_TTL_MINUTES.to_string())
            .parse::<i64>()?;
        if ttl_minutes < 1 {
            anyhow::bail!("RESET_TOKEN_TTL_MINUTES must be at least 1");
        }

        let webhook_url = env::var("MAIL_WEBHOOK_URL").ok();
        let sender =
            env::var("MAIL_SENDER").unwrap_or_else(|_| "no-reply@courseloft.dev".to_string());

        Ok(Self {
            api: ApiSettings { host, port },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
            },
            jwt: JwtSettings { secret },
            mail: MailSettings {
                webhook_url,
                sender,
            },
            reset: ResetSettings { ttl_minutes },
        })
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
