//! Pines AI - antagonist detection and teleportation
//!
//! This crate drives the antagonist each frame:
//!
//! - Visibility from the camera frustum plus a line-of-sight raycast
//! - Looking / Proximity / Neither classification with look-time exposure
//! - Distance and exposure scaled damage, regeneration when undetected
//! - Aggression derived from pages collected and elapsed time
//! - Cooldown-gated, probabilistic teleports to hidden spawn positions
//!
//! # Example
//!
//! ```ignore
//! use pines_ai::prelude::*;
//!
//! let mut controller = AntagonistController::new(AntagonistConfig::default(), Some(player_id), Some(antagonist_id))?;
//!
//! // Every frame, after physics has moved the player
//! let frame = AntagonistFrame {
//!     player_position,
//!     player_eye,
//!     frustum: &frustum,
//!     physics: &physics,
//!     delta_time,
//! };
//! let report = controller.update(&frame, &mut antagonist_body, &mut player_state);
//! if controller.player_is_dead() {
//!     // game-state transition belongs to the caller
//! }
//! ```

pub mod aggression;
pub mod config;
pub mod controller;
pub mod error;
pub mod exposure;
pub mod frustum;
pub mod perception;
pub mod placement;
pub mod state;

pub mod prelude {
    pub use crate::config::{AntagonistConfig, PlayerConfig, SpawnPolicy, SpawnRegion};
    pub use crate::controller::{AntagonistBody, AntagonistController, AntagonistFrame, FrameReport, TeleportOutcome};
    pub use crate::error::{AiError, Result};
    pub use crate::frustum::{Frustum, Plane};
    pub use crate::perception::{Detection, Observation, Sightline};
    pub use crate::state::{AntagonistState, PlayerState};
}

pub use prelude::*;
