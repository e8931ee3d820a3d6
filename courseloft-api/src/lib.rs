//! # Courseloft API Server Library
//!
//! HTTP layer of the Courseloft backend. The business rules live in
//! `courseloft-shared`; this crate wires them to axum.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Uniform response envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
