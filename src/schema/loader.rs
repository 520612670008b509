//! Schema registry backed by a directory of schema documents
//!
//! - One file per schema: `<schema_dir>/<name>.json`
//! - Documents are kept raw and compiled on demand
//! - Registered schemas are immutable

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::errors::{SchemaError, SchemaResult};

/// Schema loader that reads schema files from disk and keeps them in memory by name.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    schema_dir: PathBuf,
    schemas: BTreeMap<String, Value>,
}

impl SchemaLoader {
    /// Creates a loader for the given schema directory.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            schemas: BTreeMap::new(),
        }
    }

    /// Loads every `*.json` file from the schema directory.
    ///
    /// A missing directory yields an empty registry.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            debug!(dir = %self.schema_dir.display(), "schema directory missing, registry stays empty");
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            self.load_schema_file(&path)?;
        }

        info!(
            dir = %self.schema_dir.display(),
            count = self.schemas.len(),
            "schemas loaded"
        );
        Ok(())
    }

    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                SchemaError::malformed_schema(path.display().to_string(), "File name is not UTF-8")
            })?
            .to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        let document: Value = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.register(name, document)
    }

    /// Registers a schema document under `name`.
    pub fn register(&mut self, name: impl Into<String>, document: Value) -> SchemaResult<()> {
        let name = name.into();
        if !document.is_object() && !document.is_boolean() {
            return Err(SchemaError::malformed_schema(name, "Schema document must be an object"));
        }
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::schema_immutable(name));
        }
        debug!(schema = %name, "schema registered");
        self.schemas.insert(name, document);
        Ok(())
    }

    /// Gets a raw schema document by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Returns the number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
