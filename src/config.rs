//! Configuration file handling
//!
//! Configuration is a single JSON document. Every field has a default, so an
//! absent file and `{}` are equivalent.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::logging::LogConfig;
use crate::merge::MergeOptions;
use crate::schema::{CompileOptions, DEFAULT_CUSTOM_FIELD_KEY, DEFAULT_MAX_DEPTH};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this structure
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config values are out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine behaviour shared by every host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Annotation key marking custom field compositions (default "fieldType")
    pub custom_field_key: String,

    /// Keep baseline keys the schema does not declare (default true)
    pub retain_undeclared: bool,

    /// Maximum schema nesting (default 64)
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            custom_field_key: DEFAULT_CUSTOM_FIELD_KEY.to_string(),
            retain_undeclared: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            custom_field_key: self.custom_field_key.clone(),
            max_depth: self.max_depth,
        }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            retain_undeclared: self.retain_undeclared,
            max_depth: self.max_depth,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.custom_field_key.is_empty() {
            return Err(ConfigError::Invalid("engine.custom_field_key must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("engine.max_depth must be > 0".into()));
        }
        Ok(())
    }
}

/// Top-level configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,

    pub http: HttpServerConfig,

    /// Directory of named schema documents (default "./schemas")
    pub schema_dir: String,

    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            http: HttpServerConfig::default(),
            schema_dir: "./schemas".to_string(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port must be > 0".into()));
        }
        Ok(())
    }

    /// Get schema directory as Path
    pub fn schema_path(&self) -> &Path {
        Path::new(&self.schema_dir)
    }
}
