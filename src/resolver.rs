//! Property path resolution
//!
//! Answers "is this property declared?" and "is it read-only?" for pointers
//! such as `#/vehicle/registration`. Resolution walks one token at a time
//! through object properties. Compositions resolve a pointer if any branch
//! does, since `anyOf`/`oneOf` branches are optional.
//!
//! A pointer that does not resolve is not an error: `defines_property`
//! answers false and `is_read_only` answers false.

use tracing::trace;

use crate::pointer::PropertyPointer;
use crate::schema::SchemaNode;

/// Resolves property pointers against one schema tree.
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver<'s> {
    schema: &'s SchemaNode,
}

impl<'s> PropertyResolver<'s> {
    pub fn new(schema: &'s SchemaNode) -> Self {
        Self { schema }
    }

    /// Returns true if some branch of the schema declares the property at `pointer`.
    ///
    /// The empty pointer is never defined.
    pub fn defines_property(&self, pointer: &PropertyPointer) -> bool {
        let defined = !pointer.is_empty() && defines(self.schema, pointer.tokens());
        trace!(pointer = %pointer, defined, "resolved property definition");
        defined
    }

    /// Returns true if the property at `pointer` is read-only.
    ///
    /// A read-only object makes every property below it read-only, whatever
    /// the properties declare themselves. Undefined properties are not read-only.
    pub fn is_read_only(&self, pointer: &PropertyPointer) -> bool {
        let read_only = !pointer.is_empty() && read_only(self.schema, pointer.tokens());
        trace!(pointer = %pointer, read_only, "resolved property mutability");
        read_only
    }
}

fn defines(schema: &SchemaNode, tokens: &[String]) -> bool {
    match schema {
        SchemaNode::Object(object) => {
            let Some((head, rest)) = tokens.split_first() else {
                return false;
            };
            match object.property(head) {
                None => false,
                Some(_) if rest.is_empty() => true,
                Some(property) => defines(property, rest),
            }
        }
        SchemaNode::Combined(combined) => combined.subschemas.iter().any(|s| defines(s, tokens)),
        SchemaNode::Leaf(_) => false,
    }
}

fn read_only(schema: &SchemaNode, tokens: &[String]) -> bool {
    match schema {
        SchemaNode::Object(object) => {
            let Some((head, rest)) = tokens.split_first() else {
                return false;
            };
            let Some(property) = object.property(head) else {
                return false;
            };
            if object.read_only {
                return true;
            }
            if rest.is_empty() {
                property.read_only()
            } else {
                read_only(property, rest)
            }
        }
        // A read-only composition locks everything its branches declare.
        SchemaNode::Combined(combined) if combined.read_only => defines(schema, tokens),
        SchemaNode::Combined(combined) => combined.subschemas.iter().any(|s| read_only(s, tokens)),
        SchemaNode::Leaf(_) => false,
    }
}

/// Returns true if `schema` declares the property at `pointer`.
pub fn defines_property(schema: &SchemaNode, pointer: &str) -> bool {
    PropertyResolver::new(schema).defines_property(&PropertyPointer::parse(pointer))
}

/// Returns true if the property at `pointer` is read-only.
///
/// Check [`defines_property`] first; undefined properties report false.
pub fn is_read_only(schema: &SchemaNode, pointer: &str) -> bool {
    PropertyResolver::new(schema).is_read_only(&PropertyPointer::parse(pointer))
}
