//! # Middleware Modules
//!
//! Tower middleware for the API layer. Tracing uses `tower-http`'s
//! `TraceLayer` directly; authentication lives in [`crate::auth`].

pub mod metrics;
