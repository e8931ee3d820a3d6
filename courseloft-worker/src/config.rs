/// Worker configuration
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
/// - `PUBLISH_TICK_INTERVAL_SECS`: fixed tick interval; unset means once
///   daily at 00:00 UTC
/// - `RUST_LOG`: log filter (default: info)
use std::env;
use std::time::Duration;

/// Worker configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Connection pool size
    pub max_connections: u32,

    /// Fixed tick interval; `None` means daily at midnight UTC
    pub tick_interval: Option<Duration>,
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable
    /// fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // .env support for development
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let tick_interval = match env::var("PUBLISH_TICK_INTERVAL_SECS") {
            Ok(value) => Some(Duration::from_secs(value.parse::<u64>()?)),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            tick_interval,
        })
    }
}
