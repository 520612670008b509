//! Schema subsystem
//!
//! Turns draft-07 schema documents into immutable schema trees and keeps the
//! structural-validation boundary in one place.
//!
//! # Design Principles
//!
//! - Schema trees are closed enums, matched exhaustively
//! - Trees are read-only once compiled and owned by the caller
//! - Keyword semantics belong to the validator, structure to the tree
//! - Compilation is deterministic

mod compile;
mod errors;
mod loader;
mod types;
mod validator;

pub use compile::{compile, compile_str, CompileOptions, DEFAULT_CUSTOM_FIELD_KEY, DEFAULT_MAX_DEPTH};
pub use errors::{json_type_name, MismatchDetails, SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{CombinedNode, Combinator, LeafKind, LeafNode, ObjectNode, SchemaNode};
pub use validator::SchemaValidator;
