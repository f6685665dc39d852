//! Repository configuration types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repository source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// YAML documents under a base directory
    #[default]
    #[serde(alias = "filesystem")]
    FileSystem,
    /// Documents registered in memory (tests, embedded use)
    Memory,
}

/// Where templates and assignments are read from
///
/// ```rust
/// use intake_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::file_system("repository");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// File system base path (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

impl RepositoryConfig {
    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
        }
    }

    /// Create a memory repository configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            base_path: None,
        }
    }

    /// Validate the configuration
    ///
    /// Returns an error if required fields are missing for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            RepositorySource::FileSystem => match self.base_path.as_deref() {
                Some(path) if !path.trim().is_empty() => Ok(()),
                _ => Err(ConfigError::MissingField {
                    source_kind: "file_system".to_string(),
                    field: "base_path".to_string(),
                }),
            },
            RepositorySource::Memory => Ok(()),
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required field is missing for the selected source
    #[error("{source_kind} source requires {field} to be set")]
    MissingField { source_kind: String, field: String },
}
