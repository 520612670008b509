//! Schema-driven record merge
//!
//! Walks a schema tree in lock-step with the incoming record and the
//! previously persisted baseline, building a fresh output record:
//!
//! - read-only properties only ever take the baseline value
//! - writable properties take the incoming value, or null when only the
//!   baseline had them (the field was cleared)
//! - nested objects recurse on the sub-records under their key
//! - structural compositions are merged against the same records and their
//!   keys flattened into the enclosing level, later branches winning
//! - custom-field compositions are opaque and merge like leaves
//! - a read-only composition keeps the baseline value of every key it flattens
//!
//! Inputs are never mutated.

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::options::MergeOptions;
use crate::schema::{json_type_name, MismatchDetails, ObjectNode, SchemaError, SchemaNode, SchemaResult};
use crate::DataTree;

/// Merges records according to a schema tree.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merges `incoming` over `baseline`.
    ///
    /// # Errors
    ///
    /// - `SCHEMERGE_TYPE_MISMATCH` when a value under an object-typed property is not an object
    /// - `SCHEMERGE_DEPTH_EXCEEDED` when the schema nests deeper than `max_depth`
    pub fn merge(&self, schema: &SchemaNode, incoming: &DataTree, baseline: &DataTree) -> SchemaResult<DataTree> {
        debug!(
            schema = schema.kind_name(),
            incoming = incoming.len(),
            baseline = baseline.len(),
            "merging record"
        );
        let merged = self.merge_frame(schema, incoming, baseline, "", 0)?;
        debug!(keys = merged.len(), "record merged");
        Ok(merged)
    }

    /// Merges one object level, including its undeclared baseline keys.
    fn merge_frame(
        &self,
        schema: &SchemaNode,
        incoming: &DataTree,
        baseline: &DataTree,
        path: &str,
        depth: usize,
    ) -> SchemaResult<DataTree> {
        let mut merged = self.merge_level(schema, incoming, baseline, path, depth)?;

        if self.options.retain_undeclared && opens_level(schema) {
            let declared = declared_keys(schema);
            for (key, value) in baseline {
                if !declared.contains(key.as_str()) && !merged.contains_key(key) {
                    trace!(key = %key, path = %path, "retaining undeclared key");
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(merged)
    }

    fn merge_level(
        &self,
        schema: &SchemaNode,
        incoming: &DataTree,
        baseline: &DataTree,
        path: &str,
        depth: usize,
    ) -> SchemaResult<DataTree> {
        if depth > self.options.max_depth {
            return Err(SchemaError::depth_exceeded(self.options.max_depth));
        }

        if schema.read_only() {
            return Ok(keep_baseline(schema, baseline, path));
        }

        match schema {
            SchemaNode::Object(object) => self.merge_object(object, incoming, baseline, path, depth),
            SchemaNode::Combined(combined) if !combined.custom_field => {
                let mut merged = DataTree::new();
                for subschema in &combined.subschemas {
                    merged.extend(self.merge_level(subschema, incoming, baseline, path, depth + 1)?);
                }
                Ok(merged)
            }
            // Bare leaves and custom fields have no enclosing object to attach keys to.
            SchemaNode::Combined(_) | SchemaNode::Leaf(_) => Ok(DataTree::new()),
        }
    }

    fn merge_object(
        &self,
        object: &ObjectNode,
        incoming: &DataTree,
        baseline: &DataTree,
        path: &str,
        depth: usize,
    ) -> SchemaResult<DataTree> {
        let mut merged = DataTree::new();

        for (key, property) in &object.properties {
            if property.read_only() {
                if let Some(previous) = baseline.get(key) {
                    trace!(key = %key, "keeping read-only baseline value");
                    merged.insert(key.clone(), previous.clone());
                }
                if property.as_structural_composition().is_some() {
                    merged.extend(self.merge_level(property, incoming, baseline, path, depth + 1)?);
                }
                continue;
            }

            match property {
                SchemaNode::Object(_) => {
                    let child_path = join_path(path, key);
                    let nested_incoming = subtree(incoming, key, &child_path)?;
                    let nested_baseline = subtree(baseline, key, &child_path)?;
                    let nested =
                        self.merge_frame(property, &nested_incoming, &nested_baseline, &child_path, depth + 1)?;
                    merged.insert(key.clone(), Value::Object(nested));
                }
                SchemaNode::Combined(combined) if !combined.custom_field => {
                    if !incoming.contains_key(key) && baseline.contains_key(key) {
                        merged.insert(key.clone(), Value::Null);
                    }
                    merged.extend(self.merge_level(property, incoming, baseline, path, depth + 1)?);
                }
                SchemaNode::Combined(_) | SchemaNode::Leaf(_) => {
                    if let Some(value) = incoming.get(key) {
                        merged.insert(key.clone(), value.clone());
                    } else if baseline.contains_key(key) {
                        trace!(key = %key, "clearing value absent from incoming record");
                        merged.insert(key.clone(), Value::Null);
                    }
                }
            }
        }

        Ok(merged)
    }
}

/// Merges with default options.
pub fn merge(schema: &SchemaNode, incoming: &DataTree, baseline: &DataTree) -> SchemaResult<DataTree> {
    MergeEngine::default().merge(schema, incoming, baseline)
}

/// Whether `schema` produces its own level of keys.
fn opens_level(schema: &SchemaNode) -> bool {
    match schema {
        SchemaNode::Object(_) => true,
        SchemaNode::Combined(combined) => !combined.custom_field,
        SchemaNode::Leaf(_) => false,
    }
}

/// Keys a level declares: property names plus keys flattened from structural compositions.
fn declared_keys(schema: &SchemaNode) -> HashSet<&str> {
    fn collect<'s>(schema: &'s SchemaNode, keys: &mut HashSet<&'s str>) {
        match schema {
            SchemaNode::Object(object) => {
                for (name, property) in &object.properties {
                    keys.insert(name.as_str());
                    if let Some(combined) = property.as_structural_composition() {
                        for subschema in &combined.subschemas {
                            collect(subschema, keys);
                        }
                    }
                }
            }
            SchemaNode::Combined(combined) if !combined.custom_field => {
                for subschema in &combined.subschemas {
                    collect(subschema, keys);
                }
            }
            SchemaNode::Combined(_) | SchemaNode::Leaf(_) => {}
        }
    }

    let mut keys = HashSet::new();
    collect(schema, &mut keys);
    keys
}

/// Baseline values for every key a read-only level declares.
fn keep_baseline(schema: &SchemaNode, baseline: &DataTree, path: &str) -> DataTree {
    let declared = declared_keys(schema);
    trace!(path = %path, keys = declared.len(), "keeping read-only level from baseline");
    baseline
        .iter()
        .filter(|(key, _)| declared.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// The sub-record under `key`; absent and null both read as empty.
fn subtree<'d>(data: &'d DataTree, key: &str, path: &str) -> SchemaResult<Cow<'d, DataTree>> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(Cow::Owned(Map::new())),
        Some(Value::Object(map)) => Ok(Cow::Borrowed(map)),
        Some(other) => Err(SchemaError::type_mismatch(MismatchDetails::new(
            path,
            "object",
            json_type_name(other),
        ))),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CombinedNode, Combinator, LeafKind, SchemaErrorCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> DataTree {
        value.as_object().cloned().unwrap()
    }

    fn simple_schema() -> SchemaNode {
        ObjectNode::new()
            .with_property("stringProp1", SchemaNode::leaf(LeafKind::String))
            .with_property("numberProp1", SchemaNode::read_only_leaf(LeafKind::Number))
            .into()
    }

    #[test]
    fn test_incoming_values_are_taken() {
        let merged = merge(
            &simple_schema(),
            &record(json!({ "stringProp1": "stringValue", "numberProp1": 12 })),
            &DataTree::new(),
        )
        .unwrap();

        // numberProp1 is read-only and had no baseline value
        assert_eq!(Value::Object(merged), json!({ "stringProp1": "stringValue" }));
    }

    #[test]
    fn test_cleared_value_becomes_null() {
        let merged = merge(
            &simple_schema(),
            &DataTree::new(),
            &record(json!({ "stringProp1": "old" })),
        )
        .unwrap();

        assert_eq!(Value::Object(merged), json!({ "stringProp1": null }));
    }

    #[test]
    fn test_nested_object_always_present() {
        let schema: SchemaNode = ObjectNode::new()
            .with_property(
                "address",
                ObjectNode::new()
                    .with_property("city", SchemaNode::leaf(LeafKind::String))
                    .into(),
            )
            .into();

        let merged = merge(&schema, &DataTree::new(), &DataTree::new()).unwrap();
        assert_eq!(Value::Object(merged), json!({ "address": {} }));
    }

    #[test]
    fn test_null_subtree_reads_as_empty() {
        let schema: SchemaNode = ObjectNode::new()
            .with_property(
                "address",
                ObjectNode::new()
                    .with_property("city", SchemaNode::leaf(LeafKind::String))
                    .into(),
            )
            .into();

        let merged = merge(
            &schema,
            &record(json!({ "address": null })),
            &record(json!({ "address": { "city": "Munich" } })),
        )
        .unwrap();
        assert_eq!(Value::Object(merged), json!({ "address": { "city": null } }));
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let schema: SchemaNode = ObjectNode::new()
            .with_property(
                "outer",
                ObjectNode::new()
                    .with_property("inner", ObjectNode::new().into())
                    .into(),
            )
            .into();

        let err = merge(
            &schema,
            &record(json!({ "outer": { "inner": [1, 2] } })),
            &DataTree::new(),
        )
        .unwrap_err();

        assert_eq!(err.code(), SchemaErrorCode::TypeMismatch);
        let details = err.details().unwrap();
        assert_eq!(details.path, "outer.inner");
        assert_eq!(details.actual, "array");
    }

    #[test]
    fn test_bare_leaf_and_custom_field_yield_nothing() {
        let baseline = record(json!({ "a": 1 }));
        let incoming = record(json!({ "a": 2 }));

        let leaf = SchemaNode::leaf(LeafKind::String);
        assert!(merge(&leaf, &incoming, &baseline).unwrap().is_empty());

        let custom = SchemaNode::from(CombinedNode::custom_field(
            Combinator::AllOf,
            vec![simple_schema()],
        ));
        assert!(merge(&custom, &incoming, &baseline).unwrap().is_empty());
    }

    #[test]
    fn test_later_branch_wins_on_collision() {
        let first: SchemaNode = ObjectNode::new()
            .with_property("shared", SchemaNode::read_only_leaf(LeafKind::String))
            .into();
        let second: SchemaNode = ObjectNode::new()
            .with_property("shared", SchemaNode::leaf(LeafKind::String))
            .into();
        let schema = SchemaNode::from(CombinedNode::new(Combinator::AllOf, vec![first, second]));

        let merged = merge(
            &schema,
            &record(json!({ "shared": "incoming" })),
            &record(json!({ "shared": "baseline" })),
        )
        .unwrap();
        assert_eq!(merged["shared"], json!("incoming"));
    }

    #[test]
    fn test_read_only_composition_keeps_flattened_baseline() {
        let mut section = CombinedNode::new(
            Combinator::AllOf,
            vec![ObjectNode::new()
                .with_property("approvedBy", SchemaNode::leaf(LeafKind::String))
                .into()],
        );
        section.read_only = true;
        let schema: SchemaNode = ObjectNode::new()
            .with_property("name", SchemaNode::leaf(LeafKind::String))
            .with_property("section", section.into())
            .into();

        let engine = MergeEngine::new(MergeOptions::declared_only());
        let merged = engine
            .merge(
                &schema,
                &record(json!({ "name": "x", "approvedBy": "forged" })),
                &record(json!({ "name": "old", "approvedBy": "alice" })),
            )
            .unwrap();
        assert_eq!(Value::Object(merged), json!({ "name": "x", "approvedBy": "alice" }));
    }

    #[test]
    fn test_depth_bound() {
        let mut schema: SchemaNode = ObjectNode::new()
            .with_property("leaf", SchemaNode::leaf(LeafKind::String))
            .into();
        for _ in 0..5 {
            schema = ObjectNode::new().with_property("child", schema).into();
        }

        let engine = MergeEngine::new(MergeOptions::default().with_max_depth(3));
        let err = engine.merge(&schema, &DataTree::new(), &DataTree::new()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DepthExceeded);

        let engine = MergeEngine::new(MergeOptions::default().with_max_depth(5));
        assert!(engine.merge(&schema, &DataTree::new(), &DataTree::new()).is_ok());
    }

    #[test]
    fn test_declared_keys_include_flattened_compositions() {
        let schema: SchemaNode = ObjectNode::new()
            .with_property("a", SchemaNode::leaf(LeafKind::String))
            .with_property(
                "group",
                CombinedNode::new(
                    Combinator::AnyOf,
                    vec![ObjectNode::new()
                        .with_property("b", SchemaNode::leaf(LeafKind::String))
                        .into()],
                )
                .into(),
            )
            .with_property(
                "widget",
                CombinedNode::custom_field(
                    Combinator::AllOf,
                    vec![ObjectNode::new()
                        .with_property("hidden", SchemaNode::leaf(LeafKind::String))
                        .into()],
                )
                .into(),
            )
            .into();

        let keys = declared_keys(&schema);
        assert!(keys.contains("a"));
        assert!(keys.contains("group"));
        assert!(keys.contains("b"));
        assert!(keys.contains("widget"));
        assert!(!keys.contains("hidden"));
    }
}
