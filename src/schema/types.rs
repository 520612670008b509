//! Schema tree definitions
//!
//! A compiled schema is a tree of three node shapes:
//! - leaf: no further structural decomposition (string, number, array, ...)
//! - object: a property map
//! - combined: an `allOf`/`anyOf`/`oneOf` composition whose branches live
//!   at the same logical level as the enclosing object
//!
//! Trees are immutable once compiled and may be shared freely across threads.

use std::fmt;

/// Primitive kind of a leaf schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// UTF-8 string
    String,
    /// Any JSON number
    Number,
    /// Integral JSON number
    Integer,
    /// Boolean
    Boolean,
    /// Array (items are not decomposed)
    Array,
    /// JSON null
    Null,
    /// No type constraint
    Any,
}

impl LeafKind {
    /// Returns the kind name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            LeafKind::String => "string",
            LeafKind::Number => "number",
            LeafKind::Integer => "integer",
            LeafKind::Boolean => "boolean",
            LeafKind::Array => "array",
            LeafKind::Null => "null",
            LeafKind::Any => "any",
        }
    }

    /// Maps a draft-07 `type` keyword value to a leaf kind.
    pub fn from_type_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(LeafKind::String),
            "number" => Some(LeafKind::Number),
            "integer" => Some(LeafKind::Integer),
            "boolean" => Some(LeafKind::Boolean),
            "array" => Some(LeafKind::Array),
            "null" => Some(LeafKind::Null),
            _ => None,
        }
    }
}

/// Composition keyword of a combined node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AllOf,
    AnyOf,
    OneOf,
}

impl Combinator {
    /// All composition keywords in the order they are compiled.
    pub const ALL: [Combinator; 3] = [Combinator::AllOf, Combinator::AnyOf, Combinator::OneOf];

    /// Returns the schema keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::AllOf => "allOf",
            Combinator::AnyOf => "anyOf",
            Combinator::OneOf => "oneOf",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Leaf schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub kind: LeafKind,
    pub read_only: bool,
    /// Carries the application-defined field type annotation
    pub custom_field: bool,
}

impl LeafNode {
    /// Create a writable leaf of the given kind
    pub fn new(kind: LeafKind) -> Self {
        Self {
            kind,
            read_only: false,
            custom_field: false,
        }
    }

    /// Create a read-only leaf of the given kind
    pub fn read_only(kind: LeafKind) -> Self {
        Self {
            kind,
            read_only: true,
            custom_field: false,
        }
    }
}

/// Object schema with its declared properties in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub properties: Vec<(String, SchemaNode)>,
    pub read_only: bool,
}

impl ObjectNode {
    /// Create an empty, writable object node
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, replacing an earlier declaration with the same name.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = node,
            None => self.properties.push((name, node)),
        }
        self
    }

    /// Marks the whole object read-only
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Looks up a declared property
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Iterates declared property names in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }
}

/// `allOf` / `anyOf` / `oneOf` composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedNode {
    pub combinator: Combinator,
    pub subschemas: Vec<SchemaNode>,
    /// Set when the composition represents one application-level field
    pub custom_field: bool,
    pub read_only: bool,
}

impl CombinedNode {
    /// Create a structural (non custom-field) composition
    pub fn new(combinator: Combinator, subschemas: Vec<SchemaNode>) -> Self {
        Self {
            combinator,
            subschemas,
            custom_field: false,
            read_only: false,
        }
    }

    /// Create a composition flagged as a custom field
    pub fn custom_field(combinator: Combinator, subschemas: Vec<SchemaNode>) -> Self {
        Self {
            custom_field: true,
            ..Self::new(combinator, subschemas)
        }
    }
}

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Leaf(LeafNode),
    Object(ObjectNode),
    Combined(CombinedNode),
}

impl SchemaNode {
    /// Writable leaf shorthand
    pub fn leaf(kind: LeafKind) -> Self {
        SchemaNode::Leaf(LeafNode::new(kind))
    }

    /// Read-only leaf shorthand
    pub fn read_only_leaf(kind: LeafKind) -> Self {
        SchemaNode::Leaf(LeafNode::read_only(kind))
    }

    /// The node's own `readOnly` flag
    pub fn read_only(&self) -> bool {
        match self {
            SchemaNode::Leaf(leaf) => leaf.read_only,
            SchemaNode::Object(object) => object.read_only,
            SchemaNode::Combined(combined) => combined.read_only,
        }
    }

    /// Whether the node carries the custom field annotation
    pub fn is_custom_field(&self) -> bool {
        match self {
            SchemaNode::Leaf(leaf) => leaf.custom_field,
            SchemaNode::Object(_) => false,
            SchemaNode::Combined(combined) => combined.custom_field,
        }
    }

    /// A combined node that must be flattened into its parent object.
    pub fn as_structural_composition(&self) -> Option<&CombinedNode> {
        match self {
            SchemaNode::Combined(combined) if !combined.custom_field => Some(combined),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            SchemaNode::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the node shape name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Leaf(leaf) => leaf.kind.type_name(),
            SchemaNode::Object(_) => "object",
            SchemaNode::Combined(combined) => combined.combinator.keyword(),
        }
    }
}

impl From<ObjectNode> for SchemaNode {
    fn from(object: ObjectNode) -> Self {
        SchemaNode::Object(object)
    }
}

impl From<CombinedNode> for SchemaNode {
    fn from(combined: CombinedNode) -> Self {
        SchemaNode::Combined(combined)
    }
}

impl From<LeafNode> for SchemaNode {
    fn from(leaf: LeafNode) -> Self {
        SchemaNode::Leaf(leaf)
    }
}
