use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;
use walkdir::WalkDir;

use crate::libs::error::{Error, Result};

/// A parsed schema document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub origin: String,
    pub value: Value,
}

/// Supplies the schema documents of a run.
pub trait SchemaSource {
    fn documents(&self) -> Result<Vec<SchemaDocument>>;
}

/// Reads every `*.json` file directly inside a directory, in file name order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl SchemaSource for DirectorySource {
    fn documents(&self) -> Result<Vec<SchemaDocument>> {
        let mut documents = Vec::new();
        let entries = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let origin = path.display().to_string();
            let content = fs::read_to_string(path)?;
            let value = serde_json::from_str(&content)
                .map_err(|e| Error::malformed(origin.as_str(), e.to_string()))?;
            debug!("loaded schema document {origin}");
            documents.push(SchemaDocument { origin, value });
        }

        info!(
            "found {} schema documents in {}",
            documents.len(),
            self.dir.display()
        );
        Ok(documents)
    }
}

/// Documents held in memory, yielded in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<SchemaDocument>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, origin: &str, value: Value) -> Self {
        self.documents.push(SchemaDocument {
            origin: origin.to_string(),
            value,
        });
        self
    }

    pub fn with_json(self, origin: &str, json: &str) -> Result<Self> {
        let value = serde_json::from_str(json)?;
        Ok(self.with_document(origin, value))
    }
}

impl SchemaSource for MemorySource {
    fn documents(&self) -> Result<Vec<SchemaDocument>> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_json_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_orders.json"), r#"{"tableName": "orders"}"#).unwrap();
        fs::write(dir.path().join("a_users.json"), r#"{"tableName": "users"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let documents = DirectorySource::new(dir.path()).documents().unwrap();

        let tables: Vec<_> = documents
            .iter()
            .map(|d| d.value["tableName"].as_str().unwrap())
            .collect();
        assert_eq!(tables, ["users", "orders"]);
        assert!(documents[0].origin.ends_with("a_users.json"));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let err = DirectorySource::new(dir.path()).documents().unwrap_err();
        assert!(matches!(err, Error::MalformedSchema { .. }));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirectorySource::new(dir.path().join("absent")).documents().is_err());
    }

    #[test]
    fn memory_source_keeps_insertion_order() {
        let source = MemorySource::new()
            .with_document("two", json!({"tableName": "two"}))
            .with_json("one", r#"{"tableName": "one"}"#)
            .unwrap();

        let origins: Vec<_> = source
            .documents()
            .unwrap()
            .into_iter()
            .map(|d| d.origin)
            .collect();
        assert_eq!(origins, ["two", "one"]);
    }
}
