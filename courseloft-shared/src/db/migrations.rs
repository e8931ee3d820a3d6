/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root and are embedded
/// at compile time with `sqlx::migrate!`. Both binaries run them on
/// startup; re-running applied migrations is a no-op.
use sqlx::PgPool;
use tracing::info;

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the database
/// connection is lost mid-run.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("database schema up to date");
    Ok(())
}
