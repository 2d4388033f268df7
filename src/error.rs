//! # Error Types
//!
//! Custom error types for MOVR Teleop using `thiserror`.

use thiserror::Error;

/// Main error type for MOVR Teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Joystick state too short to read the mapped buttons and axes
    #[error("Malformed joystick state: need at least 2 buttons and 2 axes, got {buttons} buttons and {axes} axes")]
    MalformedInput { buttons: usize, axes: usize },

    /// Message encoding/decoding errors
    #[error("Message codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gamepad device errors
    #[error("Gamepad error: {0}")]
    Gamepad(String),

    /// No joystick or gamepad device found
    #[error("No joystick or gamepad found under /dev/input")]
    GamepadNotFound,

    /// In-process topic has no receiving end
    #[error("Topic closed: {0}")]
    TopicClosed(String),
}

impl TeleopError {
    /// Whether this error only affects the current event.
    ///
    /// Recoverable errors are logged and the event is dropped; the node keeps
    /// processing subsequent events.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TeleopError::MalformedInput { .. } | TeleopError::Json(_))
    }
}

/// Result type alias for MOVR Teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
