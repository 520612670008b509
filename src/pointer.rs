//! Property pointers
//!
//! Slash-delimited paths such as `#/address/city`. A leading `#` and then a
//! leading `/` are stripped before splitting. Each token is unescaped:
//! `~1` -> `/`, `~0` -> `~`, `\"` -> `"`, `\\` -> `\`.

use std::fmt;

use serde_json::{Map, Value};

use crate::schema::{json_type_name, MismatchDetails, SchemaError, SchemaResult};

/// A parsed, unescaped property pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPointer {
    raw: String,
    tokens: Vec<String>,
}

impl PropertyPointer {
    /// Parses a pointer. Parsing never fails; an empty pointer has no tokens.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.strip_prefix('#').unwrap_or(raw);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);

        let tokens = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').map(unescape).collect()
        };

        Self {
            raw: raw.to_string(),
            tokens,
        }
    }

    /// Unescaped tokens, outermost first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The pointer as supplied by the caller
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Reads the value addressed by this pointer.
    pub fn extract<'v>(&self, data: &'v Value) -> Option<&'v Value> {
        if self.is_empty() {
            return None;
        }
        self.tokens
            .iter()
            .try_fold(data, |current, token| current.as_object()?.get(token))
    }

    /// Writes `value` at this pointer, creating intermediate objects.
    ///
    /// # Errors
    ///
    /// - `SCHEMERGE_INVALID_POINTER` for an empty pointer
    /// - `SCHEMERGE_TYPE_MISMATCH` when an intermediate value is not an object
    pub fn insert(&self, data: &mut Map<String, Value>, value: Value) -> SchemaResult<()> {
        let Some((last, parents)) = self.tokens.split_last() else {
            return Err(SchemaError::invalid_pointer(&self.raw, "pointer addresses no property"));
        };

        let mut current = data;
        let mut path = String::new();
        for token in parents {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(token);

            let slot = current
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(map) => map,
                other => {
                    return Err(SchemaError::type_mismatch(MismatchDetails::new(
                        path,
                        "object",
                        json_type_name(other),
                    )))
                }
            };
        }

        current.insert(last.clone(), value);
        Ok(())
    }
}

impl fmt::Display for PropertyPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PropertyPointer {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

fn unescape(token: &str) -> String {
    token
        .replace("~1", "/")
        .replace("~0", "~")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

/// Reads the value at `pointer` in `data`.
pub fn extract_value<'v>(data: &'v Value, pointer: &str) -> Option<&'v Value> {
    PropertyPointer::parse(pointer).extract(data)
}

/// Writes `value` at `pointer` in `data`.
pub fn insert_value(data: &mut Map<String, Value>, pointer: &str, value: Value) -> SchemaResult<()> {
    PropertyPointer::parse(pointer).insert(data, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use serde_json::json;

    #[test]
    fn test_prefix_stripping() {
        assert_eq!(PropertyPointer::parse("#/a/b").tokens(), ["a", "b"]);
        assert_eq!(PropertyPointer::parse("/a/b").tokens(), ["a", "b"]);
        assert_eq!(PropertyPointer::parse("a/b").tokens(), ["a", "b"]);
        assert_eq!(PropertyPointer::parse("#a").tokens(), ["a"]);
    }

    #[test]
    fn test_empty_pointers() {
        for raw in ["", "#", "/", "#/"] {
            assert!(PropertyPointer::parse(raw).is_empty(), "{:?}", raw);
        }
    }

    #[test]
    fn test_unescaping() {
        let pointer = PropertyPointer::parse(r#"#/a~1b/c~0d/e\"f/g\\h"#);
        assert_eq!(pointer.tokens(), ["a/b", "c~d", "e\"f", "g\\h"]);
    }

    #[test]
    fn test_tilde_one_is_unescaped_before_tilde_zero() {
        assert_eq!(PropertyPointer::parse("~01").tokens(), ["~1"]);
    }

    #[test]
    fn test_extract() {
        let data = json!({ "a": { "b": 1 }, "c": 2 });
        assert_eq!(extract_value(&data, "#/a/b"), Some(&json!(1)));
        assert_eq!(extract_value(&data, "/c"), Some(&json!(2)));
        assert_eq!(extract_value(&data, "/c/d"), None);
        assert_eq!(extract_value(&data, "/missing"), None);
        assert_eq!(extract_value(&data, "#"), None);
    }

    #[test]
    fn test_insert_creates_intermediates() {
        let mut data = Map::new();
        insert_value(&mut data, "#/a/b/c", json!("x")).unwrap();
        assert_eq!(Value::Object(data), json!({ "a": { "b": { "c": "x" } } }));
    }

    #[test]
    fn test_insert_overwrites_leaf() {
        let mut data = json!({ "a": { "b": 1 } }).as_object().cloned().unwrap();
        insert_value(&mut data, "/a/b", json!(2)).unwrap();
        assert_eq!(data["a"]["b"], json!(2));
    }

    #[test]
    fn test_insert_through_scalar_fails() {
        let mut data = json!({ "a": 1 }).as_object().cloned().unwrap();
        let err = insert_value(&mut data, "/a/b", json!(2)).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::TypeMismatch);
        assert_eq!(err.details().unwrap().path, "a");
    }

    #[test]
    fn test_insert_empty_pointer_fails() {
        let mut data = Map::new();
        let err = insert_value(&mut data, "#", json!(1)).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidPointer);
    }
}
