//! Execution orchestrator.
//!
//! Composes the pipeline for one execution request: catalog lookup ->
//! target resolution -> parameter binding -> tracking record creation ->
//! remote execution -> terminal tracking update. All validation completes
//! before any externally visible action (tracking creation, remote
//! execution) begins, so a rejected request leaves zero side effects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use runbook_core::catalog::{find_script, load_catalog};
use runbook_core::params::bind;
use runbook_tracking::TrackingStatus;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Inbound execution request body.
#[derive(Debug, Deserialize)]
pub struct ExecutionRequest {
    /// Name of the catalog script to run.
    pub script: String,
    /// Caller-assigned correlation token; the server assigns a UUID when
    /// absent so every execution is traceable.
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// Generic key/value payload bound to the script's declared parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Outcome of one orchestrated execution, success or failure.
///
/// The tracking record id, when one exists, travels in the `process_id`
/// body field on both paths.
#[derive(Debug, Serialize)]
pub struct ExecutionReport {
    /// Identifier of the resolved catalog script.
    pub script_id: String,
    /// Correlation token linking response, logs, and tracking record.
    pub correlation_id: String,
    /// Numeric tracking record id, when tracking applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<i64>,
    /// Combined remote stdout/stderr (possibly partial on failure).
    pub output: String,
    /// Failure description; `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionReport {
    /// Whether the remote execution failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Run one execution request end to end.
pub async fn run(state: &AppState, request: ExecutionRequest) -> AppResult<ExecutionReport> {
    let correlation_id = request
        .correlation_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match run_pipeline(state, &request, &correlation_id).await {
        Ok(report) => Ok(report),
        Err(err) => {
            tracing::error!(
                correlation_id = %correlation_id,
                script = %request.script,
                error = %err,
                "Execution request failed"
            );
            Err(err)
        }
    }
}

async fn run_pipeline(
    state: &AppState,
    request: &ExecutionRequest,
    correlation_id: &str,
) -> AppResult<ExecutionReport> {
    if request.script.is_empty() {
        return Err(AppError::BadRequest(
            "'script' must be a non-empty string".to_string(),
        ));
    }

    // Catalog is re-read per request: edits take effect on the next call.
    let catalog = load_catalog(&state.config.scripts_path)?;
    let script = find_script(&catalog, &request.script)
        .ok_or_else(|| AppError::ScriptNotFound(request.script.clone()))?
        .clone();
    tracing::info!(
        correlation_id,
        script_id = %script.id,
        "Matched execution request to catalog script"
    );

    let target = state
        .resolver
        .resolve(&state.config.namespace, &state.config.pod_label_selector)
        .await?;
    tracing::info!(correlation_id, target = %target, "Resolved execution target");

    let env_prefix = bind(&script.parameters, &request.params)?;

    // Validation is complete; from here on actions are externally visible.
    // The tracking record is created at most once, synchronously, before
    // execution begins. A failed creation leaves no record to update, so
    // execution continues untracked.
    let process_id = if script.monitored {
        let stage = script
            .stage
            .as_deref()
            .unwrap_or(state.config.tracking_stage.as_str());
        match state
            .tracker
            .create(&script.name, correlation_id, stage, &state.config.tracking_group)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(
                    correlation_id,
                    error = %err,
                    "Failed to create tracking record, continuing untracked"
                );
                None
            }
        }
    } else {
        None
    };

    let full_command = format!("{env_prefix}{}", script.command);
    tracing::info!(
        correlation_id,
        script_id = %script.id,
        target = %target,
        "Executing remote command"
    );
    let result = state
        .executor
        .execute(&state.config.namespace, &target, &full_command)
        .await;

    // The terminal tracking transition happens exactly once, before the
    // response is returned to the caller.
    if result.failed {
        let detail = result
            .detail
            .unwrap_or_else(|| "remote command failed".to_string());
        tracing::error!(
            correlation_id,
            script_id = %script.id,
            detail = %detail,
            "Remote execution failed"
        );
        state
            .tracker
            .update(process_id, TrackingStatus::Failed, Some(&detail))
            .await;
        return Ok(ExecutionReport {
            script_id: script.id,
            correlation_id: correlation_id.to_string(),
            process_id,
            output: result.output,
            error: Some(format!("Script execution failed: {detail}")),
        });
    }

    tracing::info!(correlation_id, script_id = %script.id, "Remote execution successful");
    state
        .tracker
        .update(process_id, TrackingStatus::Successful, None)
        .await;
    Ok(ExecutionReport {
        script_id: script.id,
        correlation_id: correlation_id.to_string(),
        process_id,
        output: result.output,
        error: None,
    })
}
