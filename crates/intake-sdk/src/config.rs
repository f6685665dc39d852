//! Configuration types for FlowEngine
//!
//! Loaded from (later sources win):
//! 1. built-in defaults
//! 2. `config/intake.{toml,yaml,json}` if present
//! 3. `INTAKE__*` environment variables, e.g. `INTAKE__CACHE__TTL_SECS=60`
//!    or `INTAKE__REPOSITORY__BASE_PATH=/srv/intake` (a `.env` file is read first)

use std::path::Path;
use std::time::Duration;

use intake_repository::{CacheConfig, RepositoryConfig};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where templates and assignments are read from
    pub repository: RepositoryConfig,

    /// Repository cache settings
    pub cache: CacheSettings,

    /// Refuse to build questionnaires that have authoring warnings
    pub strict_warnings: bool,

    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,

    /// Output format of the tracing subscriber
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::file_system("repository"),
            cache: CacheSettings::default(),
            strict_warnings: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/intake").required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file, still honouring `INTAKE__*` overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let builder =
            config::Config::builder().add_source(config::File::from(path.as_ref()).required(true));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix("INTAKE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.repository.validate()?;
        tracing::debug!(?config, "engine configuration loaded");
        Ok(config)
    }

    /// Set the repository configuration
    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repository = repository;
        self
    }

    /// Set the cache settings
    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    /// Treat authoring warnings as configuration errors
    pub fn strict_warnings(mut self, strict: bool) -> Self {
        self.strict_warnings = strict;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

/// Repository cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// `None` for no limit
    pub max_entries: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: Some(1000),
        }
    }
}

impl CacheSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.enabled,
            ttl: Duration::from_secs(self.ttl_secs),
            capacity: self.max_entries,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
