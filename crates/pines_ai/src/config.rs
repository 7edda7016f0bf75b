//! Antagonist and player tuning

use crate::error::{AiError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Antagonist tuning, fixed for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AntagonistConfig {
    /// Range at which the antagonist can hurt the player at all
    pub detection_distance: f32,
    /// "Behind you" range that detects without line of sight
    pub close_distance: f32,
    /// Health removed per second at zero distance and zero look time
    pub damage_rate: f32,
    /// How strongly accumulated look time amplifies damage
    pub look_time_factor: f32,
    /// Look-time amplification discount while only in proximity
    pub proximity_multiplier: f32,
    /// Seconds between teleport opportunities
    pub teleport_cooldown: f32,
    /// Lower bound of the aggression value
    pub min_ai_value: i32,
    /// Upper bound of the aggression value
    pub max_ai_value: i32,
    /// Aggression before any pages or time
    pub starting_ai_value: i32,
    /// Game time that adds one aggression step
    pub seconds_per_aggression_step: f32,
    /// Bounding sphere radius for frustum tests
    pub bounding_radius: f32,
    /// Random spread added to the placement bias
    pub placement_jitter: f32,
    /// Where teleports may land
    pub spawn: SpawnPolicy,
}

impl Default for AntagonistConfig {
    fn default() -> Self {
        Self {
            detection_distance: 20.0,
            close_distance: 5.0,
            damage_rate: 10.0,
            look_time_factor: 0.5,
            proximity_multiplier: 0.5,
            teleport_cooldown: 3.0,
            min_ai_value: 0,
            max_ai_value: 20,
            starting_ai_value: 1,
            seconds_per_aggression_step: 90.0,
            bounding_radius: 1.0,
            placement_jitter: 0.15,
            spawn: SpawnPolicy::Region(SpawnRegion::default()),
        }
    }
}

impl AntagonistConfig {
    /// Set detection and close distances
    pub fn with_distances(mut self, detection: f32, close: f32) -> Self {
        self.detection_distance = detection;
        self.close_distance = close;
        self
    }

    /// Set the aggression range and starting value
    pub fn with_aggression(mut self, min: i32, max: i32, starting: i32) -> Self {
        self.min_ai_value = min;
        self.max_ai_value = max;
        self.starting_ai_value = starting;
        self
    }

    /// Set the teleport cooldown
    pub fn with_teleport_cooldown(mut self, seconds: f32) -> Self {
        self.teleport_cooldown = seconds;
        self
    }

    /// Use a fixed list of spawn points
    pub fn with_spawn_points(mut self, points: Vec<Vec3>) -> Self {
        self.spawn = SpawnPolicy::SpawnPoints { points };
        self
    }

    /// Search a spawn region procedurally
    pub fn with_spawn_region(mut self, region: SpawnRegion) -> Self {
        self.spawn = SpawnPolicy::Region(region);
        self
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.detection_distance.is_nan() || self.detection_distance <= 0.0 {
            return Err(AiError::InvalidConfig(format!(
                "detection_distance must be positive, got {}",
                self.detection_distance
            )));
        }
        if self.close_distance < 0.0 || self.close_distance > self.detection_distance {
            return Err(AiError::InvalidConfig(format!(
                "close_distance {} must lie in [0, detection_distance]",
                self.close_distance
            )));
        }
        if self.min_ai_value > self.max_ai_value {
            return Err(AiError::InvalidConfig(format!(
                "min_ai_value {} exceeds max_ai_value {}",
                self.min_ai_value, self.max_ai_value
            )));
        }
        if self.teleport_cooldown < 0.0 {
            return Err(AiError::InvalidConfig("teleport_cooldown is negative".to_string()));
        }
        if let SpawnPolicy::Region(region) = &self.spawn {
            region.validate()?;
        }
        Ok(())
    }
}

/// How teleport destinations are chosen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Pick among fixed points, closer ones as aggression rises
    SpawnPoints { points: Vec<Vec3> },
    /// Probe random positions around the player inside a bounding box
    Region(SpawnRegion),
}

/// Bounds and probe settings for the procedural spawn search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRegion {
    /// Minimum corner of the spawn box
    pub min: Vec3,
    /// Maximum corner of the spawn box
    pub max: Vec3,
    /// Height of the antagonist's centre above the ground hit
    pub spawn_height: f32,
    /// Candidates tried before giving up for this cycle
    pub max_attempts: u32,
    /// Target distance at full aggression
    pub near_distance: f32,
    /// Target distance at zero aggression
    pub far_distance: f32,
    /// Ground probes start this far above the candidate
    pub ground_probe_height: f32,
    /// Length of the four side probes for enclosure
    pub enclosure_probe: f32,
    /// Smallest ground normal Y that still counts as walkable
    pub min_ground_normal_y: f32,
}

impl Default for SpawnRegion {
    fn default() -> Self {
        Self {
            min: Vec3::new(-100.0, 0.0, -100.0),
            max: Vec3::new(100.0, 0.0, 100.0),
            spawn_height: 1.0,
            max_attempts: 10,
            near_distance: 8.0,
            far_distance: 40.0,
            ground_probe_height: 50.0,
            enclosure_probe: 2.0,
            min_ground_normal_y: 0.7,
        }
    }
}

impl SpawnRegion {
    fn validate(&self) -> Result<()> {
        if self.min.x > self.max.x || self.min.z > self.max.z {
            return Err(AiError::InvalidConfig(format!(
                "spawn region min {:?} exceeds max {:?}",
                self.min, self.max
            )));
        }
        if self.near_distance < 0.0 || self.far_distance < self.near_distance {
            return Err(AiError::InvalidConfig(format!(
                "spawn distances must satisfy 0 <= near ({}) <= far ({})",
                self.near_distance, self.far_distance
            )));
        }
        Ok(())
    }
}

/// Player vitals and movement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    /// Health regained per second while undetected
    pub health_regen_rate: f32,
    pub max_stamina: f32,
    /// Stamina spent per second of sprinting
    pub stamina_drain_rate: f32,
    /// Stamina regained per second once the delay has passed
    pub stamina_regen_rate: f32,
    /// Seconds after sprinting before stamina regenerates
    pub stamina_regen_delay: f32,
    /// Walking speed in units per second
    pub walk_speed: f32,
    /// Speed multiplier while sprinting
    pub sprint_multiplier: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            health_regen_rate: 5.0,
            max_stamina: 100.0,
            stamina_drain_rate: 20.0,
            stamina_regen_rate: 15.0,
            stamina_regen_delay: 1.0,
            walk_speed: 3.0,
            sprint_multiplier: 2.0,
        }
    }
}
