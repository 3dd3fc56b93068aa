//! Jelly photo API server library.
//!
//! Exposes configuration, state, error handling, backend wiring and routes
//! so integration tests and the binary entrypoint share the same pieces.

pub mod backends;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
