//! # Error Types
//!
//! Custom error types for the head tracker link layer using `thiserror`.

use thiserror::Error;

/// Main error type for the head tracker link layer
#[derive(Debug, Error)]
pub enum HeadLinkError {
    /// A bounded buffer would have been written past its capacity
    #[error("Buffer overflow: capacity of {capacity} bytes exceeded")]
    BufferOverflow { capacity: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Command channel payload errors
    #[error("Command error: {0}")]
    Command(#[from] serde_json::Error),

    /// BLE collaborator errors
    #[error("Bluetooth error: {0}")]
    Ble(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// No usable serial port among the candidates
    #[error("No SBUS serial port found (tried: {0})")]
    SerialPortNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the head tracker link layer
pub type Result<T> = std::result::Result<T, HeadLinkError>;
