use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use runbook_core::catalog::CatalogError;
use runbook_core::params::ParamError;
use runbook_kube::KubeError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error taxonomy and implements [`IntoResponse`] to
/// produce consistent JSON error responses. Tracking errors never appear
/// here: they are logged at the point of failure and do not affect the
/// primary flow.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The script catalog document is unreadable or invalid.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No catalog entry matches the requested script name.
    #[error("Script '{0}' not found")]
    ScriptNotFound(String),

    /// Parameter binding failed.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Target resolution or another cluster interaction failed.
    #[error(transparent)]
    Kube(#[from] KubeError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Catalog(err) => {
                tracing::error!(error = %err, "Script catalog failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    self.to_string(),
                )
            }

            AppError::ScriptNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }

            AppError::Param(ParamError::MissingParameter(_)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            // Sanitization producing an invalid identifier is a defect in
            // this service, not caller input.
            AppError::Param(err @ ParamError::InvalidName { .. }) => {
                tracing::error!(error = %err, "Parameter name sanitization defect");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error processing parameter names".to_string(),
                )
            }

            AppError::Kube(KubeError::TargetUnavailable(_)) => (
                StatusCode::BAD_GATEWAY,
                "TARGET_UNAVAILABLE",
                self.to_string(),
            ),
            AppError::Kube(err) => {
                tracing::error!(error = %err, "Cluster interaction failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
