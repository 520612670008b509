//! Engine HTTP Routes
//!
//! Every POST body names its schema either inline or by registry name.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::ApiResult;
use crate::schema::{SchemaError, SchemaLoader};
use crate::service::SerializationService;
use crate::DataTree;

// ==================
// Shared State
// ==================

/// State shared across handlers
#[derive(Debug, Default)]
pub struct AppState {
    pub loader: SchemaLoader,
    pub service: SerializationService,
}

impl AppState {
    pub fn new(loader: SchemaLoader, service: SerializationService) -> Self {
        Self { loader, service }
    }

    fn resolve<'a>(&'a self, schema: &'a SchemaRef) -> ApiResult<Cow<'a, Value>> {
        match schema {
            SchemaRef::Inline(document) => Ok(Cow::Borrowed(document)),
            SchemaRef::Name(name) => self
                .loader
                .get(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| SchemaError::unknown_schema(name).into()),
        }
    }
}

// ==================
// Request/Response Types
// ==================

/// A registry name or an inline schema document
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Name(String),
    Inline(Value),
}

#[derive(Debug, Deserialize)]
pub struct SerializeRequest {
    pub schema: SchemaRef,
    #[serde(default)]
    pub data: Option<DataTree>,
    #[serde(default, rename = "previousData")]
    pub previous_data: Option<DataTree>,
}

#[derive(Debug, Deserialize)]
pub struct DeserializeRequest {
    pub schema: SchemaRef,
    #[serde(default)]
    pub data: Option<DataTree>,
}

#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub schema: SchemaRef,
    pub pointer: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub schema: SchemaRef,
    #[serde(default)]
    pub data: Value,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schemas: usize,
}

// ==================
// Routes
// ==================

/// Create engine routes
pub fn engine_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/serialize", post(serialize_handler))
        .route("/deserialize", post(deserialize_handler))
        .route("/properties/defined", post(defined_handler))
        .route("/properties/read-only", post(read_only_handler))
        .route("/validate", post(validate_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schemas: state.loader.schema_count(),
    };

    (StatusCode::OK, Json(response))
}

async fn serialize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SerializeRequest>, JsonRejection>,
) -> ApiResult<Json<DataTree>> {
    let Json(request) = payload?;
    let schema = state.resolve(&request.schema)?;
    let merged = state.service.serialize_data(
        &schema,
        &request.data.unwrap_or_default(),
        &request.previous_data.unwrap_or_default(),
    )?;
    Ok(Json(merged))
}

async fn deserialize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeserializeRequest>, JsonRejection>,
) -> ApiResult<Json<DataTree>> {
    let Json(request) = payload?;
    let schema = state.resolve(&request.schema)?;
    let filtered = state
        .service
        .deserialize_data(&schema, &request.data.unwrap_or_default())?;
    Ok(Json(filtered))
}

async fn defined_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let schema = state.resolve(&request.schema)?;
    let defined = state.service.defines_property(&schema, &request.pointer)?;
    Ok(Json(json!({ "defined": defined })))
}

async fn read_only_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let schema = state.resolve(&request.schema)?;
    let read_only = state.service.is_read_only_property(&schema, &request.pointer)?;
    Ok(Json(json!({ "readOnly": read_only })))
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let schema = state.resolve(&request.schema)?;
    state.service.validate(&schema, &request.data)?;
    Ok(Json(json!({ "valid": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_ref_untagged() {
        let by_name: SchemaRef = serde_json::from_value(json!("vehicle")).unwrap();
        assert!(matches!(by_name, SchemaRef::Name(ref n) if n == "vehicle"));

        let inline: SchemaRef = serde_json::from_value(json!({ "type": "object" })).unwrap();
        assert!(matches!(inline, SchemaRef::Inline(_)));

        let boolean: SchemaRef = serde_json::from_value(json!(true)).unwrap();
        assert!(matches!(boolean, SchemaRef::Inline(Value::Bool(true))));
    }

    #[test]
    fn test_serialize_request_field_names() {
        let request: SerializeRequest = serde_json::from_value(json!({
            "schema": "vehicle",
            "data": { "a": 1 },
            "previousData": null
        }))
        .unwrap();
        assert_eq!(request.data.map(|d| d.len()), Some(1));
        assert!(request.previous_data.is_none());
    }

    #[test]
    fn test_unknown_schema_name() {
        let state = AppState::default();
        let err = state.resolve(&SchemaRef::Name("missing".into())).unwrap_err();
        assert_eq!(err.code(), "SCHEMERGE_UNKNOWN_SCHEMA");
    }
}
