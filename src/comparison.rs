use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Change classification marking an environment as unaffected.
pub const NO_CHANGE: &str = "none";

/// The full diff of a feature-flag deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComparisonDocument {
    pub flags: BTreeMap<String, FlagChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlagChange {
    /// Classification of the flag itself ("add", "update", ...). Only the
    /// per-environment changes decide approval.
    pub change: String,
    pub environments: BTreeMap<String, EnvironmentChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentChange {
    pub change: String,
}

impl EnvironmentChange {
    pub fn is_unchanged(&self) -> bool {
        self.change == NO_CHANGE
    }
}

/// Parses and structurally validates a comparison document.
pub fn parse_comparison(json: &str) -> Result<ComparisonDocument> {
    serde_json::from_str(json).map_err(|e| Error::Validation(e.to_string()))
}

/// Reads a comparison document from disk and validates it.
pub fn load_comparison(path: &Path) -> Result<ComparisonDocument> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "Read comparison document");
    parse_comparison(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_flags() {
        let doc = parse_comparison(r#"{ "flags": {} }"#).unwrap();
        assert!(doc.flags.is_empty());
    }

    #[test]
    fn test_parse_nested_changes() {
        let doc = parse_comparison(
            r#"{
                "flags": {
                    "foo": {
                        "change": "update",
                        "environments": {
                            "test": { "change": "update" },
                            "prod": { "change": "none" }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let foo = &doc.flags["foo"];
        assert_eq!(foo.change, "update");
        assert!(!foo.environments["test"].is_unchanged());
        assert!(foo.environments["prod"].is_unchanged());
    }

    #[test]
    fn test_parse_ignores_extra_properties() {
        let doc = parse_comparison(
            r#"{
                "generatedAt": "2024-01-01",
                "flags": {
                    "foo": {
                        "change": "add",
                        "kind": "boolean",
                        "environments": { "test": { "change": "add", "values": [1] } }
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.flags.len(), 1);
    }

    #[test]
    fn test_parse_rejects_missing_flags() {
        let err = parse_comparison(r#"{ "flag": {} }"#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        for json in [
            r#"{ "flags": [] }"#,
            r#"{ "flags": { "foo": { "change": 1, "environments": {} } } }"#,
            r#"{ "flags": { "foo": { "change": "add" } } }"#,
            r#"{ "flags": { "foo": { "change": "add", "environments": { "test": {} } } } }"#,
            r#"{ "flags": { "foo": { "change": "add", "environments": { "test": "none" } } } }"#,
            r#"[]"#,
            "not json",
        ] {
            let err = parse_comparison(json).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{json}: got {err:?}");
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_comparison(&path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.json");
        std::fs::write(&path, r#"{ "flags": {} }"#).unwrap();
        assert!(load_comparison(&path).unwrap().flags.is_empty());
    }
}
