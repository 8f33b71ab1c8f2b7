//! Execution target resolution.
//!
//! Finds the pod a script runs in by querying the cluster for pods matching
//! the configured label selector. Among multiple matches the first result
//! wins -- the ordering is whatever the query yields and must not be relied
//! upon.

use async_trait::async_trait;
use tokio::process::Command;

use crate::KubeError;

/// Resolves the pod name a command executes in.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Return the name of the first pod matching `selector` in `namespace`.
    async fn resolve(&self, namespace: &str, selector: &str) -> Result<String, KubeError>;
}

/// [`TargetResolver`] backed by `kubectl get pods`.
pub struct KubectlResolver {
    program: String,
}

impl KubectlResolver {
    pub fn new() -> Self {
        Self {
            program: "kubectl".to_string(),
        }
    }
}

impl Default for KubectlResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetResolver for KubectlResolver {
    async fn resolve(&self, namespace: &str, selector: &str) -> Result<String, KubeError> {
        let output = Command::new(&self.program)
            .args([
                "get",
                "pods",
                "-n",
                namespace,
                "-l",
                selector,
                "-o",
                "jsonpath={.items[0].metadata.name}",
            ])
            .output()
            .await
            .map_err(|e| {
                KubeError::TargetUnavailable(format!("pod lookup failed to run: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KubeError::TargetUnavailable(format!(
                "pod lookup failed (namespace: {namespace}, selector: {selector}): {}",
                stderr.trim()
            )));
        }

        let pod_name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if pod_name.is_empty() {
            return Err(KubeError::TargetUnavailable(format!(
                "no pod matched selector '{selector}' in namespace '{namespace}'"
            )));
        }

        tracing::debug!(namespace, selector, pod = %pod_name, "Resolved execution target");
        Ok(pod_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
