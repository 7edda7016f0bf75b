//! Error types for the AI system

use thiserror::Error;

/// AI system errors
#[derive(Debug, Error)]
pub enum AiError {
    /// A required entity was not supplied at initialization
    #[error("AI controller requires a {0} entity")]
    MissingEntity(&'static str),

    /// Invalid configuration
    #[error("Invalid AI configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for AI operations
pub type Result<T> = std::result::Result<T, AiError>;
