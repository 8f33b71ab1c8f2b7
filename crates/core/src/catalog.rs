//! Script catalog loading and validation.
//!
//! The catalog is a JSON document listing every script the service may
//! execute. It is re-read on each request (live reload): edits to the
//! backing file take effect on the very next call. A load either yields the
//! complete validated catalog or fails -- no partial result is ever
//! returned.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A parameter a script accepts, declared in the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    /// Key the caller supplies in the request payload. Also the basis of
    /// the environment variable name the value is bound to.
    pub name: String,
    /// Type tag shown to callers (`string`, `number`, ...). Defaults to
    /// `string` when the document omits it.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Whether the caller may omit this parameter.
    #[serde(default)]
    pub optional: bool,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_kind() -> String {
    "string".to_string()
}

/// One executable script definition from the catalog document.
///
/// Immutable once loaded. The `command` text may embed secrets and must
/// never be exposed through the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptDefinition {
    /// Stable identifier. Auto-derived as a slug of `name` when the
    /// document omits it; an explicit value wins.
    #[serde(default)]
    pub id: String,
    /// Display name; also the lookup key for execution requests.
    pub name: String,
    /// Shell command text executed inside the target pod.
    pub command: String,
    /// Parameters the script accepts, in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
    /// Whether executions of this script report to the tracking service.
    #[serde(default = "default_monitored")]
    pub monitored: bool,
    /// Tracking stage label overriding the configured default.
    #[serde(default)]
    pub stage: Option<String>,
}

fn default_monitored() -> bool {
    true
}

/// Errors raised while loading or validating the catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document could not be read from disk.
    #[error("Failed to read script catalog at {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for the expected schema.
    #[error("Failed to parse script catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An entry parsed but fails validation.
    #[error("Invalid script catalog entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

/// Read, parse, and validate the catalog document at `path`.
///
/// Invoked fresh on every relevant request; no caching.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<ScriptDefinition>, CatalogError> {
    let path = path.as_ref();
    let document =
        std::fs::read_to_string(path).map_err(|source| CatalogError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
    parse_catalog(&document)
}

/// Parse and validate a catalog document already in memory.
pub fn parse_catalog(document: &str) -> Result<Vec<ScriptDefinition>, CatalogError> {
    let mut definitions: Vec<ScriptDefinition> = serde_json::from_str(document)?;

    for (index, def) in definitions.iter_mut().enumerate() {
        if def.name.is_empty() {
            return Err(CatalogError::InvalidEntry {
                index,
                reason: "missing required 'name' field".to_string(),
            });
        }
        if def.command.is_empty() {
            return Err(CatalogError::InvalidEntry {
                index,
                reason: format!("script '{}' is missing required 'command' field", def.name),
            });
        }
        if def.id.is_empty() {
            def.id = slugify(&def.name);
            if def.id.is_empty() {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: format!("cannot derive an id from script name '{}'", def.name),
                });
            }
        }
        for (param_index, param) in def.parameters.iter().enumerate() {
            if param.name.is_empty() {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: format!(
                        "parameter {} of script '{}' is missing required 'name' field",
                        param_index, def.name
                    ),
                });
            }
        }
    }

    Ok(definitions)
}

/// Find a script by display name. First match in catalog order wins.
pub fn find_script<'a>(
    catalog: &'a [ScriptDefinition],
    name: &str,
) -> Option<&'a ScriptDefinition> {
    catalog.iter().find(|def| def.name == name)
}

/// Derive a stable identifier from a display name: lowercase, with every
/// run of non-alphanumeric characters collapsed to a single hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_valid_catalog() {
        let catalog = parse_catalog(
            r#"[
                {
                    "id": "disk-usage",
                    "name": "Disk usage",
                    "command": "du -sh /data",
                    "parameters": [
                        {"name": "depth", "type": "number", "optional": true}
                    ]
                }
            ]"#,
        )
        .expect("parse");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, "disk-usage");
        assert_eq!(catalog[0].parameters[0].kind, "number");
        assert!(catalog[0].parameters[0].optional);
        assert!(catalog[0].monitored);
    }

    #[test]
    fn parameter_type_defaults_to_string() {
        let catalog = parse_catalog(
            r#"[{"name": "x", "command": "true", "parameters": [{"name": "p"}]}]"#,
        )
        .expect("parse");
        assert_eq!(catalog[0].parameters[0].kind, "string");
        assert!(!catalog[0].parameters[0].optional);
    }

    #[test]
    fn id_is_derived_from_name_when_omitted() {
        let catalog =
            parse_catalog(r#"[{"name": "Sleep X seconds", "command": "sleep 1"}]"#).expect("parse");
        assert_eq!(catalog[0].id, "sleep-x-seconds");
    }

    #[test]
    fn explicit_id_wins_over_derivation() {
        let catalog = parse_catalog(r#"[{"id": "s1", "name": "Sleep", "command": "sleep 1"}]"#)
            .expect("parse");
        assert_eq!(catalog[0].id, "s1");
    }

    #[test]
    fn whole_load_fails_on_missing_command() {
        let err = parse_catalog(
            r#"[
                {"name": "ok", "command": "true"},
                {"name": "broken", "command": ""}
            ]"#,
        )
        .expect_err("should fail");
        assert!(matches!(err, CatalogError::InvalidEntry { index: 1, .. }));
    }

    #[test]
    fn whole_load_fails_on_empty_name() {
        let err = parse_catalog(r#"[{"name": "", "command": "true"}]"#).expect_err("should fail");
        assert!(matches!(err, CatalogError::InvalidEntry { index: 0, .. }));
    }

    #[test]
    fn whole_load_fails_on_unnamed_parameter() {
        let err = parse_catalog(
            r#"[{"name": "x", "command": "true", "parameters": [{"name": ""}]}]"#,
        )
        .expect_err("should fail");
        assert!(matches!(err, CatalogError::InvalidEntry { index: 0, .. }));
    }

    #[test]
    fn whole_load_fails_on_underivable_id() {
        let err = parse_catalog(r#"[{"name": "???", "command": "true"}]"#).expect_err("should fail");
        assert!(matches!(err, CatalogError::InvalidEntry { index: 0, .. }));
    }

    #[test]
    fn malformed_json_fails() {
        let err = parse_catalog("not json").expect_err("should fail");
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_catalog("/nonexistent/scripts.json").expect_err("should fail");
        assert!(matches!(err, CatalogError::Unreadable { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(file, r#"[{{"name": "where am i", "command": "pwd"}}]"#).expect("write");
        let catalog = load_catalog(file.path()).expect("load");
        assert_eq!(catalog[0].id, "where-am-i");
        assert_eq!(catalog[0].command, "pwd");
    }

    #[test]
    fn find_script_first_match_wins() {
        let catalog = parse_catalog(
            r#"[
                {"id": "a", "name": "dup", "command": "echo a"},
                {"id": "b", "name": "dup", "command": "echo b"}
            ]"#,
        )
        .expect("parse");
        let found = find_script(&catalog, "dup").expect("found");
        assert_eq!(found.id, "a");
        assert!(find_script(&catalog, "missing").is_none());
    }

    #[test]
    fn slugify_collapses_runs_and_lowercases() {
        assert_eq!(slugify("Sleep X seconds"), "sleep-x-seconds");
        assert_eq!(slugify("  where am i  "), "where-am-i");
        assert_eq!(slugify("a--b__c"), "a-b-c");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
    }
}
