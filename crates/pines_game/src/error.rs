//! Error types for the play session

use pines_ai::AiError;
use pines_audio::AudioError;
use pines_physics::PhysicsError;
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// A system needs an entity the scene does not have
    #[error("Scene has no {0} entity")]
    MissingEntity(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene description names a component type nobody registered
    #[error("Unknown component type: {0}")]
    UnknownComponent(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, GameError>;
