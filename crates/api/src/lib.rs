//! Runbook API server library.
//!
//! Exposes the building blocks (config, state, error handling, the
//! execution orchestrator, routes) so integration tests and the binary
//! entrypoint both access them.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod router;
pub mod routes;
pub mod state;
