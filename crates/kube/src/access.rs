//! Startup permission self-check.
//!
//! Before accepting any request the service verifies, via the cluster's
//! own authorization review (`kubectl auth can-i`), that it holds exactly
//! the permissions execution needs. A denial is fatal: the process must
//! refuse to start rather than fail on the first request.

use tokio::process::Command;

use crate::KubeError;

/// The verbs the service must hold in its target namespace:
/// (verb, resource, subresource, description).
const REQUIRED_ACCESS: [(&str, &str, Option<&str>, &str); 3] = [
    ("get", "pods", None, "Get Pods"),
    ("list", "pods", None, "List Pods"),
    ("create", "pods", Some("exec"), "Create Pods/Exec"),
];

/// Verify every required permission in `namespace`, failing on the first
/// denial or probe error.
pub async fn check_permissions(namespace: &str) -> Result<(), KubeError> {
    check_with_program("kubectl", namespace).await
}

async fn check_with_program(program: &str, namespace: &str) -> Result<(), KubeError> {
    for (verb, resource, subresource, description) in REQUIRED_ACCESS {
        let allowed = can_i(program, namespace, verb, resource, subresource).await?;
        if !allowed {
            tracing::error!(namespace, permission = description, "Permission check FAILED");
            return Err(KubeError::PermissionDenied(format!(
                "{description} in namespace {namespace}"
            )));
        }
        tracing::info!(namespace, permission = description, "Permission check passed");
    }
    Ok(())
}

/// Ask the cluster whether the current service account may perform
/// `verb resource[/subresource]` in `namespace`.
async fn can_i(
    program: &str,
    namespace: &str,
    verb: &str,
    resource: &str,
    subresource: Option<&str>,
) -> Result<bool, KubeError> {
    let mut cmd = Command::new(program);
    cmd.args(["auth", "can-i", verb, resource, "-n", namespace]);
    if let Some(sub) = subresource {
        cmd.arg(format!("--subresource={sub}"));
    }

    // `kubectl auth can-i` prints `yes` or `no` and exits 1 on denial, so
    // only the stdout token distinguishes denial from a broken probe.
    let output = cmd.output().await?;
    let answer = String::from_utf8_lossy(&output.stdout);
    match answer.trim() {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(KubeError::PermissionDenied(format!(
            "access review for '{verb} {resource}' returned '{other}': {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
