//! Database access
//!
//! - `pool`: PostgreSQL connection pool construction
//! - `migrations`: embedded migration runner

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
