//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional. Only the node around the
//! translator is configurable; the joystick mapping itself is fixed.
//!
//! ```toml
//! [node]
//! name = "movr_teleop_joy_pub"
//! status_interval = 1000
//!
//! [input]
//! source = "gamepad"
//! device_path = "/dev/input/event5"
//! invert_axes = true
//!
//! [logging]
//! level = "info"
//!
//! [telemetry]
//! enabled = true
//! log_dir = "./logs"
//! ```

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, TeleopError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
}

/// Node identity and status reporting
#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    #[serde(default = "default_node_name")]
    pub name: String,

    #[serde(default = "default_status_interval")]
    pub status_interval: u64,
}

/// Where joystick snapshots come from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// JSON Lines on standard input
    Stdin,
    /// Linux evdev joystick/gamepad
    Gamepad,
}

/// Joystick input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_source")]
    pub source: InputSource,

    /// Empty means auto-detect (gamepad source only)
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_invert_axes")]
    pub invert_axes: bool,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty means stderr only
    #[serde(default)]
    pub file_dir: String,
}

/// Command recording configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_node_name() -> String { "movr_teleop_joy_pub".to_string() }
fn default_status_interval() -> u64 { 1000 }

fn default_input_source() -> InputSource { InputSource::Stdin }
fn default_invert_axes() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

/// Accepted values for `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
            status_interval: default_status_interval(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: default_input_source(),
            device_path: String::new(),
            invert_axes: default_invert_axes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: String::new(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use movr_teleop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.node.name.trim().is_empty() {
            return Err(invalid("node name cannot be empty"));
        }

        if self.node.status_interval == 0 {
            return Err(invalid("status_interval must be greater than 0"));
        }

        if self.input.source == InputSource::Stdin && !self.input.device_path.is_empty() {
            return Err(invalid("device_path is only used with source = \"gamepad\""));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(invalid(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }
}

fn invalid(message: impl std::fmt::Display) -> TeleopError {
    TeleopError::Config(toml::de::Error::custom(message))
}
