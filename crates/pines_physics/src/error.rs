//! Physics errors

use crate::world::StaticBodyHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("Bad physics config: {0}")]
    InvalidConfig(String),

    /// rapier rejected the collider geometry
    #[error("Cannot build collider: {0}")]
    InvalidShape(String),

    #[error("Static mesh '{0}' has no triangles")]
    EmptyMesh(String),

    /// Handle was never issued or its body is already gone
    #[error("No static body for {0:?}")]
    BodyNotFound(StaticBodyHandle),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
