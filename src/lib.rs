//! schemerge - schema-driven record merging
//!
//! Given a draft-07 JSON schema, an incoming record and the previously
//! persisted record, computes the record to persist. Read-only properties
//! keep their persisted value, properties missing from the incoming record
//! are cleared, and compositions (`allOf`/`anyOf`/`oneOf`) are flattened into
//! their parent level.
//!
//! Also answers root-key filtering and property pointer queries against the
//! same schema trees.

pub mod cli;
pub mod config;
pub mod filter;
pub mod http_server;
pub mod logging;
pub mod merge;
pub mod pointer;
pub mod resolver;
pub mod schema;
pub mod service;

/// One JSON object level of a record.
pub type DataTree = serde_json::Map<String, serde_json::Value>;

pub use filter::{filter_known_keys, root_keys};
pub use merge::{merge, MergeEngine, MergeOptions};
pub use pointer::PropertyPointer;
pub use resolver::{defines_property, is_read_only, PropertyResolver};
pub use schema::{SchemaError, SchemaErrorCode, SchemaNode, SchemaResult};
pub use service::SerializationService;
