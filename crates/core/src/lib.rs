//! Shared configuration types for the collector workspace.

pub mod config;

pub use config::{CollectorConfig, Config, ConfigError, LoggingConfig, RejectionPolicy, SettlePolicy};
