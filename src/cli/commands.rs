//! CLI command implementations
//!
//! One-shot commands read a single request from stdin, call the
//! serialization service and write one framed response to stdout.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::http_server::{AppState, HttpServer};
use crate::logging;
use crate::schema::{SchemaError, SchemaLoader};
use crate::service::SerializationService;
use crate::DataTree;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

#[derive(Debug, Deserialize)]
struct SerializeInput {
    #[serde(default)]
    data: Option<DataTree>,
    #[serde(default, rename = "previousData")]
    previous_data: Option<DataTree>,
}

#[derive(Debug, Deserialize)]
struct RecordInput {
    #[serde(default)]
    data: Option<DataTree>,
}

#[derive(Debug, Deserialize)]
struct ValueInput {
    #[serde(default)]
    data: Value,
}

/// Parse arguments, run the command and frame any failure on stdout.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    match execute(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn execute(cli: Cli) -> CliResult<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    logging::init(&config.log)
        .map_err(|e| CliError::config_error(format!("Failed to initialize logging: {}", e)))?;

    run_command(cli.command, &config)
}

/// Dispatch a parsed command
pub fn run_command(command: Command, config: &Config) -> CliResult<()> {
    let service = SerializationService::new(config.engine.clone());

    let data = match command {
        Command::Serialize { schema } => serialize(&service, &schema, read_request()?)?,
        Command::Deserialize { schema } => deserialize(&service, &schema, read_request()?)?,
        Command::Defines { schema, pointer } => defines(&service, &schema, &pointer)?,
        Command::ReadOnly { schema, pointer } => read_only(&service, &schema, &pointer)?,
        Command::Validate { schema } => validate(&service, &schema, read_request()?)?,
        Command::Serve => return serve(config),
    };

    write_response(data)
}

/// Merge the request's `data` over its `previousData`
pub fn serialize(service: &SerializationService, schema_path: &Path, request: Value) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let input: SerializeInput = serde_json::from_value(request)?;
    let merged = service.serialize_data(
        &schema,
        &input.data.unwrap_or_default(),
        &input.previous_data.unwrap_or_default(),
    )?;
    Ok(Value::Object(merged))
}

/// Filter the request's `data` down to declared root keys
pub fn deserialize(service: &SerializationService, schema_path: &Path, request: Value) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let input: RecordInput = serde_json::from_value(request)?;
    let filtered = service.deserialize_data(&schema, &input.data.unwrap_or_default())?;
    Ok(Value::Object(filtered))
}

pub fn defines(service: &SerializationService, schema_path: &Path, pointer: &str) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let defined = service.defines_property(&schema, pointer)?;
    Ok(json!({ "defined": defined }))
}

pub fn read_only(service: &SerializationService, schema_path: &Path, pointer: &str) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let read_only = service.is_read_only_property(&schema, pointer)?;
    Ok(json!({ "readOnly": read_only }))
}

pub fn validate(service: &SerializationService, schema_path: &Path, request: Value) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let input: ValueInput = serde_json::from_value(request)?;
    service.validate(&schema, &input.data)?;
    Ok(json!({ "valid": true }))
}

/// Load the schema registry and serve HTTP until the process stops
pub fn serve(config: &Config) -> CliResult<()> {
    let mut loader = SchemaLoader::new(config.schema_path());
    loader.load_all()?;
    info!(
        schemas = loader.schema_count(),
        dir = %config.schema_dir,
        "schema registry loaded"
    );

    let state = AppState::new(loader, SerializationService::new(config.engine.clone()));
    let server = HttpServer::new(config.http.clone(), state);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to start runtime: {}", e)))?;
    runtime
        .block_on(server.start())
        .map_err(|e| CliError::serve_failed(e.to_string()))
}

fn load_schema(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read schema '{}': {}", path.display(), e)))?;
    debug!(path = %path.display(), "schema document read");

    serde_json::from_str(&content).map_err(|e| {
        SchemaError::malformed_schema("#", format!("Invalid JSON in '{}': {}", path.display(), e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn schema_file(dir: &TempDir, schema: Value) -> std::path::PathBuf {
        let path = dir.path().join("schema.json");
        fs::write(&path, serde_json::to_string(&schema).unwrap()).unwrap();
        path
    }

    fn vehicle_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "plate": { "type": "string" },
                "vin": { "type": "string", "readOnly": true }
            }
        })
    }

    #[test]
    fn test_serialize_command() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        let result = serialize(
            &service,
            &path,
            json!({
                "data": { "plate": "B-XY 1", "vin": "forged" },
                "previousData": { "plate": "B-AB 2", "vin": "WVW123" }
            }),
        )
        .unwrap();

        assert_eq!(result, json!({ "plate": "B-XY 1", "vin": "WVW123" }));
    }

    #[test]
    fn test_serialize_without_previous_data() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        let result = serialize(&service, &path, json!({ "data": { "plate": "X" } })).unwrap();
        assert_eq!(result, json!({ "plate": "X" }));
    }

    #[test]
    fn test_deserialize_command() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        let result = deserialize(&service, &path, json!({ "data": { "plate": "X", "color": "red" } })).unwrap();
        assert_eq!(result, json!({ "plate": "X" }));
    }

    #[test]
    fn test_property_commands() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        assert_eq!(defines(&service, &path, "#/plate").unwrap(), json!({ "defined": true }));
        assert_eq!(defines(&service, &path, "#/color").unwrap(), json!({ "defined": false }));
        assert_eq!(read_only(&service, &path, "#/vin").unwrap(), json!({ "readOnly": true }));
    }

    #[test]
    fn test_validate_command() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        assert_eq!(
            validate(&service, &path, json!({ "data": { "plate": "X" } })).unwrap(),
            json!({ "valid": true })
        );
        let err = validate(&service, &path, json!({ "data": { "plate": 7 } })).unwrap_err();
        assert_eq!(err.code_str(), "SCHEMERGE_VALIDATION_FAILED");
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = TempDir::new().unwrap();
        let service = SerializationService::default();
        let err = defines(&service, &dir.path().join("absent.json"), "#/a").unwrap_err();
        assert_eq!(err.code_str(), "SCHEMERGE_CLI_IO_ERROR");
    }

    #[test]
    fn test_schema_file_with_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let service = SerializationService::default();

        let err = defines(&service, &path, "#/a").unwrap_err();
        assert_eq!(err.code_str(), "SCHEMERGE_MALFORMED_SCHEMA");
    }

    #[test]
    fn test_request_with_non_object_data() {
        let dir = TempDir::new().unwrap();
        let path = schema_file(&dir, vehicle_schema());
        let service = SerializationService::default();

        let err = deserialize(&service, &path, json!({ "data": [1, 2] })).unwrap_err();
        assert_eq!(err.code_str(), "SCHEMERGE_CLI_INVALID_REQUEST");
    }
}
