//! Physics configuration

use serde::{Deserialize, Serialize};

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector applied by the rapier pipeline (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of substeps per frame
    pub max_substeps: u32,

    /// Solver iterations
    pub solver_iterations: usize,

    /// Player character tuning
    pub character: CharacterConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 10,
            solver_iterations: 4,
            character: CharacterConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the substep cap
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Set character tuning
    pub fn with_character(mut self, character: CharacterConfig) -> Self {
        self.character = character;
        self
    }

    /// Check the values that would otherwise stall or explode the step loop
    pub fn validate(&self) -> crate::Result<()> {
        if self.timestep.is_nan() || self.timestep <= 0.0 {
            return Err(crate::PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(crate::PhysicsError::InvalidConfig(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kinematic character controller tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Downward acceleration applied to the capsule (units/s²)
    pub gravity: f32,

    /// Initial upward speed of a jump (units/s)
    pub jump_speed: f32,

    /// Highest apex a jump may reach; caps the effective jump speed
    pub max_jump_height: f32,

    /// Terminal falling speed (units/s)
    pub fall_speed_cap: f32,

    /// Steepest walkable slope in degrees
    pub max_slope_degrees: f32,

    /// Tallest ledge the capsule steps onto automatically
    pub step_height: f32,

    /// Distance kept between the capsule and geometry
    pub skin_width: f32,

    /// Max distance the capsule snaps down to stay grounded
    pub snap_to_ground: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            gravity: 29.4,
            jump_speed: 6.0,
            max_jump_height: 1.5,
            fall_speed_cap: 55.0,
            max_slope_degrees: 45.0,
            step_height: 0.3,
            skin_width: 0.01,
            snap_to_ground: 0.2,
        }
    }
}

impl CharacterConfig {
    /// Set gravity magnitude
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set jump speed and the apex cap
    pub fn with_jump(mut self, jump_speed: f32, max_jump_height: f32) -> Self {
        self.jump_speed = jump_speed;
        self.max_jump_height = max_jump_height;
        self
    }

    /// Set the walkable slope limit
    pub fn with_max_slope(mut self, degrees: f32) -> Self {
        self.max_slope_degrees = degrees;
        self
    }

    /// Speed that actually leaves the ground: the jump speed, limited so the
    /// apex never exceeds `max_jump_height`.
    pub fn launch_speed(&self) -> f32 {
        let apex_limited = (2.0 * self.gravity.max(0.0) * self.max_jump_height.max(0.0)).sqrt();
        self.jump_speed.min(apex_limited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let config = PhysicsConfig::default().with_timestep(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_launch_speed_capped_by_height() {
        let character = CharacterConfig::default().with_gravity(20.0).with_jump(100.0, 1.0);
        // v = sqrt(2 * g * h)
        assert_relative_eq!(character.launch_speed(), 40.0_f32.sqrt(), epsilon = 1e-5);

        let character = CharacterConfig::default().with_gravity(20.0).with_jump(2.0, 10.0);
        assert_relative_eq!(character.launch_speed(), 2.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PhysicsConfig = serde_json::from_str(r#"{ "max_substeps": 3 }"#).unwrap();
        assert_eq!(config.max_substeps, 3);
        assert_relative_eq!(config.timestep, 1.0 / 60.0);
    }
}
