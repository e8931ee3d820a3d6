/// Middleware for the API server
///
/// - Security headers on every response
/// - JWT authentication lives in `crate::app` next to the router

pub mod security;
