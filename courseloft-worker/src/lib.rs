//! # Courseloft Publication Worker
//!
//! Background worker that flips pending course content to published once
//! its release date arrives. The scheduler is the only mutator of content
//! status after creation; the transition is one-way.

pub mod config;
pub mod publisher;
