//! # Courseloft API Server
//!
//! HTTP entry point for the Courseloft backend: authentication,
//! capacity-bounded enrollment, course content authoring, and the
//! password-reset flow. Scheduled content publication runs in
//! `courseloft-worker`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p courseloft-api
//! ```

use courseloft_api::app::{build_router, AppState};
use courseloft_api::config::Config;
use courseloft_shared::db::{self, DatabaseConfig};
use courseloft_shared::store::Stores;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "courseloft_api=info,courseloft_shared=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Courseloft API v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = db::create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    db::run_migrations(&pool).await?;

    let stores = Stores::postgres(pool.clone());
    let state = AppState::new(stores, &config).with_pool(pool);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
