//! Schema error types
//!
//! Error codes:
//! - SCHEMERGE_MALFORMED_SCHEMA
//! - SCHEMERGE_UNSUPPORTED_REFERENCE
//! - SCHEMERGE_TYPE_MISMATCH
//! - SCHEMERGE_DEPTH_EXCEEDED
//! - SCHEMERGE_VALIDATION_FAILED
//! - SCHEMERGE_UNKNOWN_SCHEMA
//! - SCHEMERGE_SCHEMA_IMMUTABLE
//! - SCHEMERGE_INVALID_POINTER
//!
//! Every failure is per call. No operation returns partial output alongside an error.

use std::fmt;

/// Error codes for schema compilation and data operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema document cannot be compiled
    MalformedSchema,
    /// `$ref` that does not point into the same document
    UnsupportedReference,
    /// Data value does not have the shape the schema declares
    TypeMismatch,
    /// Schema or data nesting exceeds the configured bound
    DepthExceeded,
    /// Data violates the schema
    ValidationFailed,
    /// Schema name not registered
    UnknownSchema,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Pointer cannot address a value
    InvalidPointer,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::MalformedSchema => "SCHEMERGE_MALFORMED_SCHEMA",
            SchemaErrorCode::UnsupportedReference => "SCHEMERGE_UNSUPPORTED_REFERENCE",
            SchemaErrorCode::TypeMismatch => "SCHEMERGE_TYPE_MISMATCH",
            SchemaErrorCode::DepthExceeded => "SCHEMERGE_DEPTH_EXCEEDED",
            SchemaErrorCode::ValidationFailed => "SCHEMERGE_VALIDATION_FAILED",
            SchemaErrorCode::UnknownSchema => "SCHEMERGE_UNKNOWN_SCHEMA",
            SchemaErrorCode::SchemaImmutable => "SCHEMERGE_SCHEMA_IMMUTABLE",
            SchemaErrorCode::InvalidPointer => "SCHEMERGE_INVALID_POINTER",
        }
    }

    /// Whether the error is caused by the schema rather than the data
    pub fn is_schema_fault(&self) -> bool {
        matches!(
            self,
            SchemaErrorCode::MalformedSchema
                | SchemaErrorCode::UnsupportedReference
                | SchemaErrorCode::DepthExceeded
        )
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Shape mismatch details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchDetails {
    /// Data path (e.g., "address.city")
    pub path: String,
    /// Expected JSON type
    pub expected: String,
    /// Actual JSON type found
    pub actual: String,
}

impl MismatchDetails {
    pub fn new(path: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for MismatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': expected {}, got {}", self.path, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    details: Option<MismatchDetails>,
    violations: Vec<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            violations: Vec::new(),
        }
    }

    /// Create a malformed schema error
    pub fn malformed_schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedSchema,
            format!("Malformed schema at '{}': {}", location.into(), reason.into()),
        )
    }

    /// Create an unsupported reference error
    pub fn unsupported_reference(reference: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::UnsupportedReference,
            format!("Reference '{}' does not point into the schema document", reference.into()),
        )
    }

    /// Create a type mismatch error
    pub fn type_mismatch(details: MismatchDetails) -> Self {
        Self {
            details: Some(details.clone()),
            ..Self::new(
                SchemaErrorCode::TypeMismatch,
                format!("Data does not match schema shape at {}", details),
            )
        }
    }

    /// Create a depth exceeded error
    pub fn depth_exceeded(limit: usize) -> Self {
        Self::new(
            SchemaErrorCode::DepthExceeded,
            format!("Nesting exceeds the maximum depth of {}", limit),
        )
    }

    /// Create a validation failed error carrying every violation
    pub fn validation_failed(violations: Vec<String>) -> Self {
        Self {
            violations: violations.clone(),
            ..Self::new(
                SchemaErrorCode::ValidationFailed,
                format!("Data validation failed: {}", violations.join("; ")),
            )
        }
    }

    /// Create an unknown schema error
    pub fn unknown_schema(name: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::UnknownSchema,
            format!("Schema '{}' not found", name.into()),
        )
    }

    /// Create a schema immutable error
    pub fn schema_immutable(name: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::SchemaImmutable,
            format!("Schema '{}' is already registered and immutable", name.into()),
        )
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::InvalidPointer,
            format!("Invalid pointer '{}': {}", pointer.into(), reason.into()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns mismatch details if applicable
    pub fn details(&self) -> Option<&MismatchDetails> {
        self.details.as_ref()
    }

    /// Returns validation violations (empty unless validation failed)
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// JSON type name of a value, for mismatch details
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
