//! Remote command execution inside a target pod.
//!
//! Builds one `kubectl exec` invocation that enters the pod, starts a
//! shell, and passes the full command text as a single shell argument --
//! no intermediate shell layer re-interprets it. The call is not
//! idempotent (scripts may have real side effects), so a single attempt is
//! final; there is no retry. A bounded timeout kills runaway commands.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Outcome of one remote command execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Combined stdout and stderr captured from the remote shell. The two
    /// streams are buffered separately and concatenated (all of stdout,
    /// then all of stderr), not interleaved chronologically.
    pub output: String,
    /// Whether the command failed (nonzero exit, spawn failure, or timeout).
    pub failed: bool,
    /// Diagnostic detail distinct from the command's own output.
    pub detail: Option<String>,
}

impl ExecutionResult {
    /// A successful result carrying the captured output.
    pub fn success(output: String) -> Self {
        Self {
            output,
            failed: false,
            detail: None,
        }
    }

    /// A failed result with captured output (possibly empty) and detail.
    pub fn failure(output: String, detail: impl Into<String>) -> Self {
        Self {
            output,
            failed: true,
            detail: Some(detail.into()),
        }
    }
}

/// Executes a command inside a resolved target pod.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` in a shell inside `target` within `namespace`.
    ///
    /// Always yields a result; failures are reported through
    /// [`ExecutionResult::failed`] so partial output survives.
    async fn execute(&self, namespace: &str, target: &str, command: &str) -> ExecutionResult;
}

/// [`RemoteExecutor`] backed by `kubectl exec`.
pub struct KubectlExecutor {
    program: String,
    exec_timeout: Duration,
}

impl KubectlExecutor {
    pub fn new(exec_timeout: Duration) -> Self {
        Self {
            program: "kubectl".to_string(),
            exec_timeout,
        }
    }
}

/// Argument vector for the remote invocation. The command text is the
/// final element, handed to the remote shell as one argument.
fn exec_args<'a>(namespace: &'a str, target: &'a str, command: &'a str) -> [&'a str; 8] {
    [
        "exec", "-n", namespace, target, "--", "/bin/sh", "-c", command,
    ]
}

#[async_trait]
impl RemoteExecutor for KubectlExecutor {
    async fn execute(&self, namespace: &str, target: &str, command: &str) -> ExecutionResult {
        let mut cmd = Command::new(&self.program);
        cmd.args(exec_args(namespace, target, command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child is killed when its handle drops, which is how the
            // timeout below reclaims a runaway remote session.
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExecutionResult::failure(
                    String::new(),
                    format!("failed to spawn kubectl: {e}"),
                )
            }
        };

        match tokio::time::timeout(self.exec_timeout, child.wait_with_output()).await {
            Err(_) => ExecutionResult::failure(
                String::new(),
                format!(
                    "remote command timed out after {}s",
                    self.exec_timeout.as_secs()
                ),
            ),
            Ok(Err(e)) => {
                ExecutionResult::failure(String::new(), format!("I/O error: {e}"))
            }
            Ok(Ok(output)) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                if output.status.success() {
                    ExecutionResult::success(combined)
                } else {
                    let detail = match output.status.code() {
                        Some(code) => format!("exit status {code}"),
                        None => "terminated by signal".to_string(),
                    };
                    ExecutionResult::failure(combined, detail)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
