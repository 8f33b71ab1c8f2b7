//! Kubernetes integration for the runbook service.
//!
//! All cluster interaction goes through the `kubectl` CLI run as a
//! subprocess: pod resolution, remote command execution, and the startup
//! permission self-check. [`TargetResolver`] and [`RemoteExecutor`] are the
//! seams the orchestrator depends on, so tests can substitute fakes.

pub mod access;
pub mod exec;
pub mod resolver;

pub use exec::{ExecutionResult, KubectlExecutor, RemoteExecutor};
pub use resolver::{KubectlResolver, TargetResolver};

/// Errors raised by the cluster integration layer.
#[derive(Debug, thiserror::Error)]
pub enum KubeError {
    /// No pod matched the selector, or the pod lookup itself failed.
    #[error("No execution target available: {0}")]
    TargetUnavailable(String),

    /// The service account lacks a permission required for execution.
    #[error("Missing required cluster permission: {0}")]
    PermissionDenied(String),

    /// Spawning or communicating with the kubectl subprocess failed.
    #[error("kubectl invocation failed: {0}")]
    Subprocess(#[from] std::io::Error),
}
