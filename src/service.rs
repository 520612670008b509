//! Serialization service
//!
//! Entry point for hosts. Every operation takes the raw schema document,
//! compiles it with the configured options and then runs the engine.

use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::filter;
use crate::merge::MergeEngine;
use crate::pointer::PropertyPointer;
use crate::resolver::PropertyResolver;
use crate::schema::{self, SchemaNode, SchemaResult, SchemaValidator};
use crate::DataTree;

/// Schema-driven serialization operations
#[derive(Debug, Clone, Default)]
pub struct SerializationService {
    config: EngineConfig,
    validator: SchemaValidator,
}

impl SerializationService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            validator: SchemaValidator::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compiles schema text.
    pub fn create_schema(&self, schema_text: &str) -> SchemaResult<SchemaNode> {
        schema::compile_str(schema_text, &self.config.compile_options())
    }

    /// Compiles an already parsed schema document.
    pub fn create_schema_from_value(&self, document: &Value) -> SchemaResult<SchemaNode> {
        schema::compile(document, &self.config.compile_options())
    }

    /// Merges `data` over `previous`: the record to persist.
    pub fn serialize_data(&self, schema: &Value, data: &DataTree, previous: &DataTree) -> SchemaResult<DataTree> {
        let tree = self.create_schema_from_value(schema)?;
        let engine = MergeEngine::new(self.config.merge_options());
        let merged = engine.merge(&tree, data, previous)?;
        debug!(
            schema = tree.kind_name(),
            incoming = data.len(),
            baseline = previous.len(),
            merged = merged.len(),
            "record serialized"
        );
        Ok(merged)
    }

    /// Keeps only root keys the schema declares.
    pub fn deserialize_data(&self, schema: &Value, data: &DataTree) -> SchemaResult<DataTree> {
        let tree = self.create_schema_from_value(schema)?;
        Ok(filter::filter_known_keys(&tree, data))
    }

    pub fn extract_root_keys(&self, schema: &Value) -> SchemaResult<Vec<String>> {
        let tree = self.create_schema_from_value(schema)?;
        Ok(filter::root_keys(&tree))
    }

    pub fn defines_property(&self, schema: &Value, pointer: &str) -> SchemaResult<bool> {
        let tree = self.create_schema_from_value(schema)?;
        Ok(PropertyResolver::new(&tree).defines_property(&PropertyPointer::parse(pointer)))
    }

    pub fn is_read_only_property(&self, schema: &Value, pointer: &str) -> SchemaResult<bool> {
        let tree = self.create_schema_from_value(schema)?;
        Ok(PropertyResolver::new(&tree).is_read_only(&PropertyPointer::parse(pointer)))
    }

    /// Structural validation. The schema must also compile into a tree, so
    /// unsupported references are rejected here too.
    pub fn validate(&self, schema: &Value, data: &Value) -> SchemaResult<()> {
        self.create_schema_from_value(schema)?;
        self.validator.validate(schema, data)
    }
}
