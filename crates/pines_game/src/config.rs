//! Session configuration
//!
//! Every subsystem's tuning in one document. Missing fields fall back to
//! the defaults, so a config file only needs the values it changes:
//!
//! ```json
//! {
//!     "antagonist": { "detection_distance": 25.0 },
//!     "audio": { "master_volume": 0.6 },
//!     "pages": { "total_pages": 4 }
//! }
//! ```

use crate::error::Result;
use pines_ai::{AntagonistConfig, PlayerConfig};
use pines_audio::AudioSettings;
use pines_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Camera and capsule geometry for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye height above the capsule centre
    pub eye_height: f32,
    pub capsule_radius: f32,
    /// Full standing height of the capsule
    pub capsule_height: f32,
    /// The capsule spawns this far above the player entity
    pub spawn_offset: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of turn per unit of look input
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye_height: 0.5,
            capsule_radius: 0.4,
            capsule_height: 1.8,
            spawn_offset: 2.0,
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
            look_sensitivity: 1.0,
        }
    }
}

/// Footstep cadence and surface probe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootstepConfig {
    /// Seconds between steps while walking
    pub walk_interval: f32,
    /// Seconds between steps while sprinting
    pub sprint_interval: f32,
    pub volume: f32,
    /// Length of the downward surface probe from the capsule centre
    pub feet_probe: f32,
}

impl Default for FootstepConfig {
    fn default() -> Self {
        Self {
            walk_interval: 0.7,
            sprint_interval: 0.4,
            volume: 0.1,
            feet_probe: 2.5,
        }
    }
}

/// Page placement and pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Reach of the interaction ray
    pub interaction_distance: f32,
    /// Radius of each page's pickup sphere
    pub pickup_radius: f32,
    /// Teleport cooldown multiplier applied per page
    pub cooldown_factor: f32,
    pub pickup_clip: String,
    pub pickup_volume: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            interaction_distance: 3.0,
            pickup_radius: 0.6,
            cooldown_factor: 0.9,
            pickup_clip: "grab_page.wav".to_string(),
            pickup_volume: 0.8,
        }
    }
}

/// Everything a play session is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub antagonist: AntagonistConfig,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub audio: AudioSettings,
    pub footsteps: FootstepConfig,
    pub pages: PageConfig,
}

impl GameConfig {
    /// Parse from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_antagonist(mut self, antagonist: AntagonistConfig) -> Self {
        self.antagonist = antagonist;
        self
    }

    pub fn with_player(mut self, player: PlayerConfig) -> Self {
        self.player = player;
        self
    }

    pub fn with_audio(mut self, audio: AudioSettings) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_pages(mut self, pages: PageConfig) -> Self {
        self.pages = pages;
        self
    }

    /// Check the parts that have hard constraints
    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        self.antagonist.validate()?;
        Ok(())
    }
}
