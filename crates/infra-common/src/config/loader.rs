use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::types::{Error, Result};

/// Default environment prefix for overrides
pub const ENV_PREFIX: &str = "RTPFX";

/// Separator between the prefix and nested keys in environment variables
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
enum Layer {
    File(PathBuf),
    Inline(String),
}

/// Builds a typed configuration from TOML layers and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    layers: Vec<Layer>,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader with environment overrides under [`ENV_PREFIX`]
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    /// Add a TOML file layer. The file must exist when [`load`](Self::load) runs.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.layers.push(Layer::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add an inline TOML document layer
    pub fn with_toml_str(mut self, toml: impl Into<String>) -> Self {
        self.layers.push(Layer::Inline(toml.into()));
        self
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignore the process environment
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Merge all layers and deserialize them into `T`
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = Config::builder();

        for layer in &self.layers {
            builder = match layer {
                Layer::File(path) => {
                    debug!("Loading configuration file {}", path.display());
                    builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(true))
                }
                Layer::Inline(toml) => builder.add_source(File::from_str(toml, FileFormat::Toml)),
            };
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(Environment::with_prefix(prefix).separator(ENV_SEPARATOR));
        }

        let merged = builder.build()?;
        merged
            .try_deserialize::<T>()
            .map_err(|e| Error::Config(format!("Failed to deserialize configuration: {}", e)))
    }

    /// Parse a standalone TOML document without environment overrides
    pub fn from_toml_str<T: DeserializeOwned>(toml: &str) -> Result<T> {
        toml::from_str(toml).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }
}
