//! Schema loading from files and strings.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ResolveError;

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist,
/// or `ResolveError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ResolveError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `ResolveError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::InvalidJson {
        path: PathBuf::from("<string>"),
        source,
    })
}

/// Locate the root schema for master-schema generation.
///
/// The path is used as given when it exists; otherwise it is looked up
/// relative to `schema_dir`, so `-s cper-json.json -d schemas/` works from
/// any working directory.
pub fn locate_root_schema(schema: &Path, schema_dir: &Path) -> PathBuf {
    if schema.exists() {
        return schema.to_path_buf();
    }
    schema_dir.join(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn load_schema_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(ResolveError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_schema(file.path());
        match result {
            Err(ResolveError::InvalidJson { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn load_schema_keeps_declaration_order() {
        let schema = load_schema_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&str> = schema
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn load_schema_str_invalid() {
        let result = load_schema_str("not json");
        assert!(matches!(result, Err(ResolveError::InvalidJson { .. })));
    }

    #[test]
    fn locate_root_schema_prefers_existing_path() {
        let file = NamedTempFile::new().unwrap();
        let located = locate_root_schema(file.path(), Path::new("/elsewhere"));
        assert_eq!(located, file.path());
    }

    #[test]
    fn locate_root_schema_falls_back_to_schema_dir() {
        let dir = tempdir().unwrap();
        let located = locate_root_schema(Path::new("cper-json.json"), dir.path());
        assert_eq!(located, dir.path().join("cper-json.json"));
    }
}
