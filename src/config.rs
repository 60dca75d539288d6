//! Fixture configuration.
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. Environment variables
//! 2. Config file (path from `UNIT_FIXTURE_CONFIG`)
//! 3. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `UNIT_FIXTURE_SEED`: Seed for the shared random source (u64)
//! - `UNIT_FIXTURE_LOG_FORMAT`: Log line format (human, json, compact)
//! - `UNIT_FIXTURE_CONFIG`: Path to a TOML config file
//!
//! The minimum log level is not configurable: fixture loggers always
//! record at TRACE so no line is dropped from test output.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::logging::LogFormat;
use crate::error::{FixtureError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for the random seed.
pub const ENV_SEED: &str = "UNIT_FIXTURE_SEED";
/// Environment variable for the log line format.
pub const ENV_LOG_FORMAT: &str = "UNIT_FIXTURE_LOG_FORMAT";
/// Environment variable naming a TOML config file.
pub const ENV_CONFIG: &str = "UNIT_FIXTURE_CONFIG";

/// Settings shared by every fixture in a test binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Seed for the shared random source. Random when unset.
    pub seed: Option<u64>,
    /// Format of lines routed to the output sink.
    pub log_format: LogFormat,
    /// Fewest elements `AutoFaker::generate_many` produces.
    pub min_collection_len: usize,
    /// Most elements `AutoFaker::generate_many` produces (inclusive).
    pub max_collection_len: usize,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: None,
            log_format: LogFormat::default(),
            min_collection_len: 1,
            max_collection_len: 3,
        }
    }
}

impl FixtureConfig {
    /// Resolve configuration from the config file and environment.
    ///
    /// Returns an error only if a config file was named but is invalid,
    /// or if an environment variable holds an unparseable value.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.trim().is_empty() => Self::load_from(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Fixture config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| FixtureError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| FixtureError::Config(format!("Invalid config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(seed) = parse_seed_from_env()? {
            self.seed = Some(seed);
        }
        if let Some(format) = parse_log_format_from_env()? {
            self.log_format = format;
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.min_collection_len > self.max_collection_len {
            return Err(FixtureError::InvalidConfig {
                field: "min_collection_len",
                reason: format!(
                    "{} exceeds max_collection_len {}",
                    self.min_collection_len, self.max_collection_len
                ),
            });
        }
        Ok(())
    }
}

/// Parse the seed from `UNIT_FIXTURE_SEED`.
pub fn parse_seed_from_env() -> Result<Option<u64>> {
    match std::env::var(ENV_SEED) {
        Ok(value) if !value.trim().is_empty() => parse_seed(&value).map(Some),
        _ => Ok(None),
    }
}

/// Parse a seed value, ignoring surrounding whitespace.
pub fn parse_seed(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| FixtureError::InvalidConfig {
            field: "seed",
            reason: format!("{ENV_SEED}={value}: {e}"),
        })
}

/// Parse the log format from `UNIT_FIXTURE_LOG_FORMAT`.
pub fn parse_log_format_from_env() -> Result<Option<LogFormat>> {
    match std::env::var(ENV_LOG_FORMAT) {
        Ok(value) if !value.trim().is_empty() => LogFormat::from_arg(value.trim())
            .map(Some)
            .ok_or_else(|| FixtureError::InvalidConfig {
                field: "log_format",
                reason: format!("{ENV_LOG_FORMAT}={value}: expected human, json or compact"),
            }),
        _ => Ok(None),
    }
}
