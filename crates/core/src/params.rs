//! Parameter binding: turning an untyped request payload into shell
//! environment assignments.
//!
//! Binding is deterministic and side-effect-free. Either every required
//! declared parameter is present and the full assignment prefix is
//! produced, or the bind fails with no partial result.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::catalog::ParameterDeclaration;

static ENV_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static INVALID_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// Errors raised while binding a payload to declared parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// The caller omitted a parameter the script declares as required.
    #[error("Required parameter '{0}' is missing")]
    MissingParameter(String),

    /// Sanitization produced a name that is still not a valid environment
    /// identifier. Indicates a defect in the sanitizer, not caller input.
    #[error("Parameter name '{original}' sanitized to invalid identifier '{sanitized}'")]
    InvalidName { original: String, sanitized: String },
}

/// Render a JSON payload value as its canonical text form.
///
/// Strings pass through unquoted, numbers and booleans render their
/// canonical textual form, and anything else falls back to compact JSON.
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Sanitize a declared parameter name into an environment identifier.
///
/// Every maximal run of characters outside `[A-Za-z0-9_]` collapses to a
/// single underscore, and a leading digit gains a `_` prefix. Idempotent.
pub fn sanitize_env_name(name: &str) -> String {
    let replaced = INVALID_RUN_RE.replace_all(name, "_").into_owned();
    match replaced.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{replaced}"),
        _ => replaced,
    }
}

/// Whether `name` is a valid environment identifier.
pub fn is_valid_env_name(name: &str) -> bool {
    ENV_NAME_RE.is_match(name)
}

/// Quote `value` so it passes unaltered through one layer of shell
/// interpretation: wrapped in single quotes, with each embedded single
/// quote rendered as `'\''`.
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Bind a request payload to the declared parameters, producing the
/// environment prefix prepended to the script's command text.
///
/// Declarations are processed in order; a missing required parameter
/// aborts the whole bind. Missing optional parameters emit no assignment.
/// The result is the space-joined assignments with a trailing space, or an
/// empty string when nothing was emitted.
pub fn bind(
    declarations: &[ParameterDeclaration],
    payload: &Map<String, Value>,
) -> Result<String, ParamError> {
    let mut assignments = Vec::new();

    for decl in declarations {
        let Some(value) = payload.get(&decl.name) else {
            if decl.optional {
                continue;
            }
            return Err(ParamError::MissingParameter(decl.name.clone()));
        };

        let text = canonical_text(value);
        let env_name = sanitize_env_name(&decl.name);
        if !is_valid_env_name(&env_name) {
            return Err(ParamError::InvalidName {
                original: decl.name.clone(),
                sanitized: env_name,
            });
        }

        assignments.push(format!("{env_name}={}", shell_quote(&text)));
    }

    if assignments.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{} ", assignments.join(" ")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
