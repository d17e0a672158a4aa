//! Configuration for the collector runtime.
//!
//! Config is read from a TOML file. Every section is optional and falls back
//! to its defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [collector]
//! settle_policy = "ignore"
//! rejection_policy = "fail_fast"
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config file: {0}")]
  Io(#[from] std::io::Error),
  #[error("Failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),
}

// ============================================================================
// Collector Configuration
// ============================================================================

/// What happens when a promise is settled a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlePolicy {
  /// The second settle is dropped and reported as success
  #[default]
  Ignore,
  /// The second settle is reported to the caller as an error
  Strict,
}

impl std::str::FromStr for SettlePolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "ignore" => Ok(SettlePolicy::Ignore),
      "strict" => Ok(SettlePolicy::Strict),
      _ => Err(format!("Invalid settle policy: {}", s)),
    }
  }
}

/// How a join reacts to one of its inputs being rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
  /// Reject the aggregate as soon as any input rejects
  #[default]
  FailFast,
  /// Wait for every input, then reject with the lowest-index error
  SettleAll,
}

impl std::str::FromStr for RejectionPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "fail_fast" | "failfast" => Ok(RejectionPolicy::FailFast),
      "settle_all" | "settleall" => Ok(RejectionPolicy::SettleAll),
      _ => Err(format!("Invalid rejection policy: {}", s)),
    }
  }
}

/// Collector behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
  /// Policy applied to every promise the collector creates (default: ignore)
  pub settle_policy: SettlePolicy,

  /// Policy applied when joining the per-item promises (default: fail_fast)
  pub rejection_policy: RejectionPolicy,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Default log level: error, warn, info, debug, trace (default: info)
  /// RUST_LOG takes precedence when set
  pub level: String,

  /// Emit ANSI colours (default: true)
  pub ansi: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      ansi: true,
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Collector policies
  #[serde(default)]
  pub collector: CollectorConfig,

  /// Logging settings
  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Parse a config from TOML text
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Load a config file, failing if it is missing or invalid
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Load a config file, falling back to defaults if it is missing or invalid
  pub fn load_or_default(path: &Path) -> Self {
    if path.exists()
      && let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = Self::from_toml_str(&content)
    {
      return config;
    }

    Self::default()
  }
}
