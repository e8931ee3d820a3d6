//! # Courseloft Shared Library
//!
//! This crate contains the domain types, store boundary, and business rules
//! shared by the Courseloft API server and the publication worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Store traits plus Postgres and in-memory implementations
//! - `admission`: Capacity-bounded, ownership-aware enrollment control
//! - `recovery`: Password-reset token lifecycle and mail notifier
//! - `catalog`: Course and content authoring
//! - `auth`: Password hashing, JWT issuance, request authentication
//! - `db`: Connection pool and migration helpers

pub mod admission;
pub mod auth;
pub mod catalog;
pub mod db;
pub mod models;
pub mod recovery;
pub mod store;

/// Current version of the Courseloft shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
