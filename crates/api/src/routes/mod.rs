//! Route registration.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod scripts;

/// Routes mounted under `/v1`.
pub fn api_routes() -> Router<AppState> {
    scripts::router()
}
