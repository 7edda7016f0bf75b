//! Audio error types

use thiserror::Error;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("Failed to initialize audio device: {0}")]
    DeviceUnavailable(String),

    /// Clip file missing or unreadable
    #[error("Audio file not found: {path}")]
    ClipNotFound { path: String },

    /// Clip could not be decoded
    #[error("Failed to decode '{path}': {message}")]
    Decode { path: String, message: String },
}

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;
