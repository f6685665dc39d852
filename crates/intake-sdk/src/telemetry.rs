//! Tracing subscriber setup for binaries and services embedding the engine
//!
//! `intake-core` and `intake-parser` log through the `log` facade; the
//! subscriber installed here bridges those records into `tracing` as well.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{EngineConfig, LogFormat};
use crate::error::{Result, SdkError};

const ENGINE_TARGETS: [&str; 5] = [
    "intake_core",
    "intake_parser",
    "intake_runtime",
    "intake_repository",
    "intake_sdk",
];

/// Filter directives applying `level` to the engine crates
pub fn default_directives(level: &str) -> String {
    ENGINE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the engine crates log at the configured
/// `log_level`. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &EngineConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&config.log_level))
            .map_err(|e| SdkError::ConfigError(format!("invalid log_level: {}", e)))?,
    };

    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .try_init()
        .map_err(|e| SdkError::Telemetry(e.to_string()))
}
