//! Script catalog and execution endpoints.
//!
//! ```text
//! GET  /options -> list_scripts
//! POST /execute -> execute_script
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use runbook_core::catalog::{load_catalog, ParameterDeclaration};

use crate::error::AppResult;
use crate::orchestrator::{self, ExecutionRequest};
use crate::state::AppState;

/// One catalog entry as exposed to callers.
///
/// Deliberately excludes the command text (and the internal id): the
/// command may embed secrets and must never leave the service through the
/// listing endpoint.
#[derive(Debug, Serialize)]
pub struct ScriptListing {
    pub name: String,
    pub parameters: Vec<ParameterDeclaration>,
}

/// GET /v1/options -- the catalog as an ordered list of name + parameters.
async fn list_scripts(State(state): State<AppState>) -> AppResult<Json<Vec<ScriptListing>>> {
    let catalog = load_catalog(&state.config.scripts_path)?;
    let listings = catalog
        .into_iter()
        .map(|def| ScriptListing {
            name: def.name,
            parameters: def.parameters,
        })
        .collect();
    Ok(Json(listings))
}

/// POST /v1/execute -- run a catalog script in the target pod.
///
/// Execution failures still produce a full report body (partial output,
/// tracking id, error text) with a 500 status.
async fn execute_script(
    State(state): State<AppState>,
    Json(request): Json<ExecutionRequest>,
) -> AppResult<Response> {
    let report = orchestrator::run(&state, request).await?;
    let status = if report.failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    Ok((status, Json(report)).into_response())
}

/// Script routes, mounted under `/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(list_scripts))
        .route("/execute", post(execute_script))
}
