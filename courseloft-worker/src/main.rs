//! # Courseloft Worker
//!
//! Timer-driven publication worker. Once per day (or at a fixed interval
//! when `PUBLISH_TICK_INTERVAL_SECS` is set) it re-evaluates pending
//! course content and publishes every item whose release date has arrived.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p courseloft-worker
//! ```

use courseloft_shared::db::{self, DatabaseConfig};
use courseloft_shared::store::Stores;
use courseloft_worker::config::WorkerConfig;
use courseloft_worker::publisher::{PublicationScheduler, SchedulerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courseloft_worker=info,courseloft_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Courseloft worker v{} starting", env!("CARGO_PKG_VERSION"));

    let config = WorkerConfig::from_env()?;

    let pool = db::create_pool(DatabaseConfig {
        url: config.database_url.clone(),
        max_connections: config.max_connections,
        ..Default::default()
    })
    .await?;
    db::run_migrations(&pool).await?;

    let stores = Stores::postgres(pool);
    let scheduler = PublicationScheduler::new(
        stores.content,
        SchedulerConfig {
            tick_interval: config.tick_interval,
        },
    );

    let shutdown = scheduler.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    scheduler.run().await;
    Ok(())
}
