//! Authentication utilities
//!
//! - `password`: Argon2id hashing and verification
//! - `jwt`: HS256 access and refresh tokens
//! - `middleware`: request authentication for axum handlers

pub mod jwt;
pub mod middleware;
pub mod password;
