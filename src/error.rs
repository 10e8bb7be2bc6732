//! # Error Types
//!
//! Custom error types for the PS4 controller node using `thiserror`.

use thiserror::Error;

/// Main error type for the PS4 controller node
#[derive(Debug, Error)]
pub enum Ps4ControllerError {
    /// Parameter file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A parameter was present but unusable
    #[error("Invalid parameter '{name}': {reason}")]
    Param { name: String, reason: String },

    /// Messaging bus errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed JSON on the wire
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the PS4 controller node
pub type Result<T> = std::result::Result<T, Ps4ControllerError>;
