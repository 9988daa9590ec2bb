//! Application configuration
//!
//! Read from TOML, then overridden from the environment:
//!
//! | Variable         | Field               |
//! |------------------|---------------------|
//! | `QUILL_MODEL`    | `provider.model`    |
//! | `QUILL_ENDPOINT` | `provider.endpoint` |
//! | `QUILL_DATA_DIR` | `storage.data_dir`  |

use quill_mutation::EngineConfig;
use quill_provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Rendering TOML failed
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON data files
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".quill"),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Model provider
    pub provider: ProviderConfig,
    /// Local storage
    pub storage: StorageConfig,
    /// Mutation engine
    pub engine: EngineConfig,
}

impl QuillConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.data_dir = dir.into();
        self
    }

    /// Parse TOML; absent keys take their defaults
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed input
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file; a missing file yields the defaults
    ///
    /// # Errors
    /// `ConfigError::Io` if the file exists but cannot be read,
    /// `ConfigError::Parse` if it is malformed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply `QUILL_*` overrides looked up through `lookup`
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(model) = get("QUILL_MODEL") {
            self.provider.model = model;
        }
        if let Some(endpoint) = get("QUILL_ENDPOINT") {
            self.provider.endpoint = endpoint;
        }
        if let Some(dir) = get("QUILL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        self
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `ConfigError::Render` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(QuillConfig::from_toml_str("").unwrap(), QuillConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = QuillConfig::from_toml_str(
            r#"
            [provider]
            model = "openai/gpt-4o-mini"

            [engine]
            serialize_per_id = true
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.model, "openai/gpt-4o-mini");
        assert_eq!(config.provider.timeout_secs, 60);
        assert!(config.engine.serialize_per_id);
        assert_eq!(config.engine.history_limit, 64);
        assert_eq!(config.storage.data_dir, PathBuf::from(".quill"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = QuillConfig::from_toml_str("[provider\nmodel=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuillConfig::load(&dir.path().join("quill.toml")).unwrap();
        assert_eq!(config, QuillConfig::default());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        let config = QuillConfig::new().with_data_dir("/tmp/story");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(QuillConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn overrides_replace_fields() {
        let env: HashMap<&str, &str> = [
            ("QUILL_MODEL", "m/x"),
            ("QUILL_ENDPOINT", "http://localhost:8080/v1/chat/completions"),
            ("QUILL_DATA_DIR", " "),
        ]
        .into_iter()
        .collect();

        let config = QuillConfig::new().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.provider.model, "m/x");
        assert_eq!(config.provider.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.storage.data_dir, PathBuf::from(".quill"));
    }
}
