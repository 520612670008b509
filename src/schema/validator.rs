//! Structural validation of records against draft-07 schema documents
//!
//! Keyword semantics (`required`, `pattern`, `format`, numeric bounds) are
//! delegated to the `jsonschema` validator. The validator never mutates data
//! and reports every violation, not only the first.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

use super::errors::{SchemaError, SchemaResult};

/// Draft-07 validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates `data` against `schema`.
    ///
    /// # Errors
    ///
    /// - `SCHEMERGE_MALFORMED_SCHEMA` if the validator cannot compile the schema
    /// - `SCHEMERGE_VALIDATION_FAILED` with one entry per violation otherwise
    pub fn validate(&self, schema: &Value, data: &Value) -> SchemaResult<()> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| SchemaError::malformed_schema(e.schema_path.to_string(), e.to_string()))?;

        let violations: Vec<String> = match compiled.validate(data) {
            Ok(()) => return Ok(()),
            Err(errors) => errors
                .map(|e| format!("{}: {}", display_path(&e.instance_path.to_string()), e))
                .collect(),
        };

        debug!(count = violations.len(), "record rejected by schema");
        Err(SchemaError::validation_failed(violations))
    }
}

/// Renders an instance path in `#/a/b` form; the document root is `#`.
fn display_path(instance_path: &str) -> String {
    format!("#{}", instance_path)
}
