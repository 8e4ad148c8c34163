//! Reference index: maps schema file basenames to their paths.
//!
//! `$ref` values in the CPER schema corpus name files by basename, possibly
//! behind a relative path prefix. The index is built once by walking the
//! schema directory and never changes afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ResolveError;
use crate::loader::load_schema;

/// Extension of files picked up by the index.
pub const SCHEMA_EXTENSION: &str = "json";

/// Two files under the indexed root that share a basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub basename: String,
    /// Path that was recorded first and then overwritten.
    pub replaced: PathBuf,
    /// Path the index now points at.
    pub kept: PathBuf,
}

/// Basename to path mapping over every schema file below a root directory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    root: PathBuf,
    paths: BTreeMap<String, PathBuf>,
    collisions: Vec<Collision>,
}

impl ReferenceIndex {
    /// Walk `root` recursively and record every `*.json` file.
    ///
    /// Entries are visited in file-name order, so when two files share a
    /// basename the one walked later wins. Collisions are kept in
    /// [`ReferenceIndex::collisions`].
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::FileNotFound` if `root` doesn't exist, or
    /// `ResolveError::ScanError` if a directory below it can't be read.
    pub fn build(root: &Path) -> Result<Self, ResolveError> {
        if !root.exists() {
            return Err(ResolveError::FileNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut index = ReferenceIndex {
            root: root.to_path_buf(),
            ..Default::default()
        };

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| ResolveError::ScanError {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map(|e| e == SCHEMA_EXTENSION).unwrap_or(false) {
                let basename = entry.file_name().to_string_lossy().into_owned();
                index.insert(basename, path.to_path_buf());
            }
        }

        debug!(root = %root.display(), files = index.len(), "indexed schema files");
        Ok(index)
    }

    fn insert(&mut self, basename: String, path: PathBuf) {
        if let Some(replaced) = self.paths.insert(basename.clone(), path.clone()) {
            warn!(
                basename = %basename,
                replaced = %replaced.display(),
                kept = %path.display(),
                "duplicate schema basename, later file wins"
            );
            self.collisions.push(Collision {
                basename,
                replaced,
                kept: path,
            });
        }
    }

    /// Find the file a `$ref` points at.
    ///
    /// Any path prefix is ignored: `../common/cper-json-error-status.json`
    /// and `cper-json-error-status.json` resolve to the same entry.
    pub fn lookup(&self, reference: &str) -> Option<&Path> {
        self.paths
            .get(reference_basename(reference))
            .map(PathBuf::as_path)
    }

    /// Directory the index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Basename collisions found while building the index.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over `(basename, path)` pairs in basename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// Strip everything up to the last `/` of a `$ref` value.
pub fn reference_basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Source of referenced schema documents.
///
/// The resolver asks the store for the document behind each `$ref`; the
/// store decides how a reference maps to a document.
pub trait SchemaStore {
    /// Load the document `reference` points at.
    ///
    /// Returns `Ok(None)` when nothing in the store answers to the
    /// reference. Errors are reserved for documents that exist but can't
    /// be loaded.
    fn load(&self, reference: &str) -> Result<Option<Value>, ResolveError>;
}

impl SchemaStore for ReferenceIndex {
    fn load(&self, reference: &str) -> Result<Option<Value>, ResolveError> {
        match self.lookup(reference) {
            Some(path) => load_schema(path).map(Some),
            None => Ok(None),
        }
    }
}

/// In-memory store keyed by basename.
impl SchemaStore for BTreeMap<String, Value> {
    fn load(&self, reference: &str) -> Result<Option<Value>, ResolveError> {
        Ok(self.get(reference_basename(reference)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn basename_strips_path_prefix() {
        assert_eq!(reference_basename("cper-json.json"), "cper-json.json");
        assert_eq!(
            reference_basename("./sections/cper-json-firmware-section.json"),
            "cper-json-firmware-section.json"
        );
        assert_eq!(reference_basename("../../a/b/c.json"), "c.json");
    }

    #[test]
    fn build_indexes_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("sections").join("arm").join("v8");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("root.json"), "{}").unwrap();
        fs::write(nested.join("cper-json-arm-section.json"), "{}").unwrap();
        fs::write(nested.join("notes.txt"), "not a schema").unwrap();

        let index = ReferenceIndex::build(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.lookup("sections/cper-json-arm-section.json"),
            Some(nested.join("cper-json-arm-section.json").as_path())
        );
        assert!(index.lookup("notes.txt").is_none());
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn iter_in_basename_order_and_root_kept() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();

        let index = ReferenceIndex::build(dir.path()).unwrap();
        assert_eq!(index.root(), dir.path());
        let entries: Vec<(&str, &Path)> = index.iter().collect();
        assert_eq!(
            entries,
            [
                ("a.json", dir.path().join("a.json").as_path()),
                ("b.json", dir.path().join("sub").join("b.json").as_path()),
            ]
        );
    }

    #[test]
    fn build_missing_root() {
        let result = ReferenceIndex::build(Path::new("/nonexistent/schemas"));
        assert!(matches!(result, Err(ResolveError::FileNotFound { .. })));
    }

    #[test]
    fn lookup_unknown_basename() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();

        let index = ReferenceIndex::build(dir.path()).unwrap();
        assert!(index.lookup("b.json").is_none());
    }

    #[test]
    fn basename_collision_is_recorded_and_later_file_wins() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a");
        let second = dir.path().join("b");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join("common.json"), r#"{"from": "a"}"#).unwrap();
        fs::write(second.join("common.json"), r#"{"from": "b"}"#).unwrap();

        let index = ReferenceIndex::build(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.collisions().len(), 1);
        let collision = &index.collisions()[0];
        assert_eq!(collision.basename, "common.json");
        assert_eq!(collision.replaced, first.join("common.json"));
        assert_eq!(collision.kept, second.join("common.json"));

        let loaded = index.load("common.json").unwrap().unwrap();
        assert_eq!(loaded["from"], "b");
    }

    #[test]
    fn store_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let index = ReferenceIndex::build(dir.path()).unwrap();
        assert!(index.is_empty());
        assert!(index.load("missing.json").unwrap().is_none());
    }

    #[test]
    fn store_load_propagates_invalid_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

        let index = ReferenceIndex::build(dir.path()).unwrap();
        let result = index.load("broken.json");
        assert!(matches!(result, Err(ResolveError::InvalidJson { .. })));
    }

    #[test]
    fn memory_store_uses_basename() {
        let mut store = BTreeMap::new();
        store.insert("x.json".to_string(), serde_json::json!({"type": "string"}));

        let loaded = store.load("nested/dir/x.json").unwrap().unwrap();
        assert_eq!(loaded["type"], "string");
        assert!(store.load("y.json").unwrap().is_none());
    }
}
