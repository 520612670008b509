//! Compiles draft-07 schema documents into schema trees
//!
//! Only the structure the engine consumes is extracted: object properties,
//! compositions, `readOnly` and the custom field annotation. Keyword semantics
//! (`required`, `pattern`, bounds, formats) stay with the structural validator.
//!
//! Shaping rules:
//! - `type: object` or a `properties` map makes an object node
//! - object keywords next to a composition compile to `allOf [object, composition]`
//! - several composition keywords on one node compile to `allOf` of each
//! - local `$ref`s are inlined; sibling keywords of `$ref` are ignored
//! - `if`/`then`/`else`, `not` and `items` are not decomposed

use serde_json::{Map, Value};

use super::errors::{json_type_name, SchemaError, SchemaResult};
use super::types::{CombinedNode, Combinator, LeafKind, LeafNode, ObjectNode, SchemaNode};

/// Annotation key that marks application-defined field types by default.
pub const DEFAULT_CUSTOM_FIELD_KEY: &str = "fieldType";

/// Default bound on schema and data nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling schema compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Annotation key that flags a node as a custom field
    pub custom_field_key: String,
    /// Maximum nesting (including `$ref` expansion) before compilation fails
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            custom_field_key: DEFAULT_CUSTOM_FIELD_KEY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiles a schema document.
pub fn compile(document: &Value, options: &CompileOptions) -> SchemaResult<SchemaNode> {
    let compiler = SchemaCompiler {
        root: document,
        options,
    };
    compiler.compile_node(document, "#", 0)
}

/// Parses and compiles schema text.
pub fn compile_str(text: &str, options: &CompileOptions) -> SchemaResult<SchemaNode> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| SchemaError::malformed_schema("#", format!("Invalid JSON: {}", e)))?;
    compile(&document, options)
}

struct SchemaCompiler<'a> {
    root: &'a Value,
    options: &'a CompileOptions,
}

impl<'a> SchemaCompiler<'a> {
    fn compile_node(&self, node: &'a Value, location: &str, depth: usize) -> SchemaResult<SchemaNode> {
        if depth > self.options.max_depth {
            return Err(SchemaError::depth_exceeded(self.options.max_depth));
        }

        let map = match node {
            Value::Bool(_) => return Ok(SchemaNode::leaf(LeafKind::Any)),
            Value::Object(map) => map,
            other => {
                return Err(SchemaError::malformed_schema(
                    location,
                    format!("expected a schema object, got {}", json_type_name(other)),
                ))
            }
        };

        if let Some(reference) = map.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| SchemaError::malformed_schema(location, "'$ref' must be a string"))?;
            let target = self.resolve_reference(reference, location)?;
            return self.compile_node(target, reference, depth + 1);
        }

        let read_only = match map.get("readOnly") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(SchemaError::malformed_schema(
                    location,
                    format!("'readOnly' must be a boolean, got {}", json_type_name(other)),
                ))
            }
        };
        let custom_field = map.contains_key(&self.options.custom_field_key);

        let mut compositions = Vec::new();
        for combinator in Combinator::ALL {
            let Some(branches) = map.get(combinator.keyword()) else {
                continue;
            };
            let branches = branches.as_array().ok_or_else(|| {
                SchemaError::malformed_schema(
                    location,
                    format!("'{}' must be an array of schemas", combinator),
                )
            })?;
            let subschemas = branches
                .iter()
                .enumerate()
                .map(|(i, branch)| {
                    let branch_location = format!("{}/{}/{}", location, combinator, i);
                    self.compile_node(branch, &branch_location, depth + 1)
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            compositions.push(CombinedNode::new(combinator, subschemas));
        }

        let base = self.compile_base(map, location, read_only, custom_field, depth)?;
        if compositions.is_empty() {
            return Ok(base);
        }

        let mut branches = Vec::with_capacity(compositions.len() + 1);
        if matches!(base, SchemaNode::Object(_)) {
            branches.push(base);
        } else if compositions.len() == 1 {
            let mut combined = compositions.remove(0);
            combined.custom_field = custom_field;
            combined.read_only = read_only;
            return Ok(combined.into());
        }
        branches.extend(compositions.into_iter().map(SchemaNode::from));

        Ok(CombinedNode {
            combinator: Combinator::AllOf,
            subschemas: branches,
            custom_field,
            read_only,
        }
        .into())
    }

    /// Compiles the node's own keywords, ignoring compositions.
    fn compile_base(
        &self,
        map: &'a Map<String, Value>,
        location: &str,
        read_only: bool,
        custom_field: bool,
        depth: usize,
    ) -> SchemaResult<SchemaNode> {
        let types = declared_types(map, location)?;

        if types.contains(&"object") || map.contains_key("properties") {
            let mut object = ObjectNode::new().with_read_only(read_only);
            match map.get("properties") {
                None => {}
                Some(Value::Object(properties)) => {
                    for (name, property) in properties {
                        let property_location = format!("{}/properties/{}", location, name);
                        let node = self.compile_node(property, &property_location, depth + 1)?;
                        object = object.with_property(name.clone(), node);
                    }
                }
                Some(other) => {
                    return Err(SchemaError::malformed_schema(
                        location,
                        format!("'properties' must be an object, got {}", json_type_name(other)),
                    ))
                }
            }
            return Ok(object.into());
        }

        let non_null: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
        let kind = match non_null.as_slice() {
            [] if types.is_empty() => LeafKind::Any,
            [] => LeafKind::Null,
            [single] => LeafKind::from_type_keyword(single).ok_or_else(|| {
                SchemaError::malformed_schema(location, format!("unknown type '{}'", single))
            })?,
            _ => LeafKind::Any,
        };

        Ok(LeafNode {
            kind,
            read_only,
            custom_field,
        }
        .into())
    }

    fn resolve_reference(&self, reference: &str, location: &str) -> SchemaResult<&'a Value> {
        if reference == "#" {
            return Ok(self.root);
        }
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(SchemaError::unsupported_reference(reference));
        };
        self.root.pointer(pointer).ok_or_else(|| {
            SchemaError::malformed_schema(location, format!("unresolvable reference '{}'", reference))
        })
    }
}

/// Reads the `type` keyword as a list of type names.
fn declared_types<'m>(map: &'m Map<String, Value>, location: &str) -> SchemaResult<Vec<&'m str>> {
    match map.get("type") {
        None => Ok(Vec::new()),
        Some(Value::String(single)) => Ok(vec![single.as_str()]),
        Some(Value::Array(many)) => many
            .iter()
            .map(|t| {
                t.as_str().ok_or_else(|| {
                    SchemaError::malformed_schema(location, "'type' entries must be strings")
                })
            })
            .collect(),
        Some(other) => Err(SchemaError::malformed_schema(
            location,
            format!("'type' must be a string or an array, got {}", json_type_name(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use serde_json::json;

    fn compile_default(document: Value) -> SchemaResult<SchemaNode> {
        compile(&document, &CompileOptions::default())
    }

    #[test]
    fn test_simple_object() {
        let node = compile_default(json!({
            "type": "object",
            "properties": {
                "stringProp1": { "type": "string" },
                "numberProp1": { "type": "number", "readOnly": true }
            }
        }))
        .unwrap();

        let object = node.as_object().unwrap();
        let names: Vec<_> = object.property_names().collect();
        assert_eq!(names, vec!["stringProp1", "numberProp1"]);
        assert!(!object.property("stringProp1").unwrap().read_only());
        assert!(object.property("numberProp1").unwrap().read_only());
    }

    #[test]
    fn test_properties_without_type_is_object() {
        let node = compile_default(json!({ "properties": { "a": {} } })).unwrap();
        assert!(node.as_object().unwrap().property("a").is_some());
    }

    #[test]
    fn test_bare_composition() {
        let node = compile_default(json!({
            "allOf": [
                { "type": "object", "properties": { "a": { "type": "string" } } },
                { "type": "object", "properties": { "b": { "type": "string" } } }
            ]
        }))
        .unwrap();

        match node {
            SchemaNode::Combined(combined) => {
                assert_eq!(combined.combinator, Combinator::AllOf);
                assert_eq!(combined.subschemas.len(), 2);
                assert!(!combined.custom_field);
            }
            other => panic!("expected composition, got {:?}", other),
        }
    }

    #[test]
    fn test_object_with_composition_wraps_in_all_of() {
        let node = compile_default(json!({
            "type": "object",
            "readOnly": true,
            "properties": { "a": { "type": "string" } },
            "anyOf": [ { "properties": { "b": { "type": "string" } } } ]
        }))
        .unwrap();

        let SchemaNode::Combined(combined) = node else {
            panic!("expected composition");
        };
        assert_eq!(combined.combinator, Combinator::AllOf);
        assert!(combined.read_only);
        assert!(combined.subschemas[0].as_object().unwrap().read_only);
        assert!(matches!(
            &combined.subschemas[1],
            SchemaNode::Combined(inner) if inner.combinator == Combinator::AnyOf
        ));
    }

    #[test]
    fn test_custom_field_marker() {
        let node = compile_default(json!({
            "fieldType": "user-input",
            "allOf": [ { "type": "string" } ]
        }))
        .unwrap();
        assert!(node.is_custom_field());

        let options = CompileOptions {
            custom_field_key: "x-widget".into(),
            ..CompileOptions::default()
        };
        let node = compile(&json!({ "x-widget": "date", "type": "string" }), &options).unwrap();
        assert!(node.is_custom_field());
    }

    #[test]
    fn test_local_reference_is_inlined() {
        let node = compile_default(json!({
            "definitions": {
                "address": { "type": "object", "properties": { "city": { "type": "string" } } }
            },
            "type": "object",
            "properties": { "home": { "$ref": "#/definitions/address" } }
        }))
        .unwrap();

        let home = node.as_object().unwrap().property("home").unwrap();
        assert!(home.as_object().unwrap().property("city").is_some());
    }

    #[test]
    fn test_recursive_reference_hits_depth_bound() {
        let err = compile_default(json!({
            "type": "object",
            "properties": { "child": { "$ref": "#" } }
        }))
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DepthExceeded);
    }

    #[test]
    fn test_remote_reference_rejected() {
        let err = compile_default(json!({ "$ref": "http://example.com/schema.json" })).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnsupportedReference);
    }

    #[test]
    fn test_malformed_documents() {
        for document in [
            json!(42),
            json!({ "properties": [] }),
            json!({ "allOf": {} }),
            json!({ "readOnly": "yes" }),
            json!({ "type": 7 }),
            json!({ "type": "color" }),
        ] {
            let err = compile_default(document.clone()).unwrap_err();
            assert_eq!(err.code(), SchemaErrorCode::MalformedSchema, "{}", document);
        }
    }

    #[test]
    fn test_leaf_kinds() {
        let kind = |doc: Value| match compile_default(doc).unwrap() {
            SchemaNode::Leaf(leaf) => leaf.kind,
            other => panic!("expected leaf, got {:?}", other),
        };
        assert_eq!(kind(json!({ "type": "string" })), LeafKind::String);
        assert_eq!(kind(json!({ "type": ["integer", "null"] })), LeafKind::Integer);
        assert_eq!(kind(json!({ "type": "null" })), LeafKind::Null);
        assert_eq!(kind(json!({ "type": ["string", "number"] })), LeafKind::Any);
        assert_eq!(kind(json!({})), LeafKind::Any);
        assert_eq!(kind(json!(true)), LeafKind::Any);
    }

    #[test]
    fn test_compile_str_rejects_invalid_json() {
        let err = compile_str("{ not json", &CompileOptions::default()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedSchema);
    }
}
