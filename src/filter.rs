//! Root key filter
//!
//! Drops every top-level entry of a record whose key the schema does not
//! declare at its root. Nested values are copied whole and never inspected.

use std::collections::HashSet;

use tracing::debug;

use crate::schema::SchemaNode;
use crate::DataTree;

/// Root property names declared by `schema`, in declaration order without duplicates.
///
/// Objects contribute their property names, compositions the root names of
/// every branch, leaves nothing.
pub fn root_keys(schema: &SchemaNode) -> Vec<String> {
    declared_root_names(schema).into_iter().map(str::to_string).collect()
}

fn declared_root_names(schema: &SchemaNode) -> Vec<&str> {
    fn collect<'s>(schema: &'s SchemaNode, seen: &mut HashSet<&'s str>, names: &mut Vec<&'s str>) {
        match schema {
            SchemaNode::Object(object) => {
                for name in object.property_names() {
                    if seen.insert(name) {
                        names.push(name);
                    }
                }
            }
            SchemaNode::Combined(combined) => {
                for subschema in &combined.subschemas {
                    collect(subschema, seen, names);
                }
            }
            SchemaNode::Leaf(_) => {}
        }
    }

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    collect(schema, &mut seen, &mut names);
    names
}

/// Keeps only the entries of `data` whose key is a root property of `schema`.
pub fn filter_known_keys(schema: &SchemaNode, data: &DataTree) -> DataTree {
    let known: HashSet<&str> = declared_root_names(schema).into_iter().collect();
    let filtered: DataTree = data
        .iter()
        .filter(|(key, _)| known.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    debug!(
        known = known.len(),
        kept = filtered.len(),
        dropped = data.len() - filtered.len(),
        "record filtered"
    );
    filtered
}
