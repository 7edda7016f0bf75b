//! Player-antagonist visibility and detection classification

use crate::config::AntagonistConfig;
use crate::frustum::Frustum;
use glam::Vec3;
use pines_physics::{CollisionGroups, PhysicsWorld, RaycastOptions};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// How the antagonist relates to the player this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detection {
    /// Visible and within detection distance
    Looking,
    /// Within close distance but not visible
    Proximity,
    /// Neither of the above
    Neither,
}

impl Detection {
    /// Whether the player is being detected at all
    pub fn is_detected(&self) -> bool {
        !matches!(self, Detection::Neither)
    }

    /// Look-time amplification scale for this state
    pub fn exposure_multiplier(&self, config: &AntagonistConfig) -> f32 {
        match self {
            Detection::Looking => 1.0,
            Detection::Proximity => config.proximity_multiplier,
            Detection::Neither => 0.0,
        }
    }
}

/// Classify from distance and visibility
pub fn classify(config: &AntagonistConfig, distance: f32, visible: bool) -> Detection {
    if visible && distance <= config.detection_distance {
        Detection::Looking
    } else if distance <= config.close_distance {
        Detection::Proximity
    } else {
        Detection::Neither
    }
}

/// Yaw that turns a model at `from` to face `to`
pub fn facing_yaw(from: Vec3, to: Vec3) -> f32 {
    let direction = (to - from).normalize_or_zero();
    direction.x.atan2(direction.z) + FRAC_PI_2
}

/// What the player can see this frame: current frustum plus sightline raycasts
pub struct Sightline<'a> {
    physics: &'a PhysicsWorld,
    frustum: &'a Frustum,
    eye: Vec3,
    radius: f32,
    target_tag: u128,
}

impl<'a> Sightline<'a> {
    /// Hits on any body of the entity in the low 64 bits of `target_tag` do
    /// not count as occluders
    pub fn new(physics: &'a PhysicsWorld, frustum: &'a Frustum, eye: Vec3, radius: f32, target_tag: u128) -> Self {
        Self {
            physics,
            frustum,
            eye,
            radius,
            target_tag,
        }
    }

    /// Physics world the sightline probes
    pub fn physics(&self) -> &'a PhysicsWorld {
        self.physics
    }

    /// Player eye position
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Whether a sphere of the configured radius at `point` is inside the frustum
    pub fn in_frustum(&self, point: Vec3) -> bool {
        self.frustum.contains_sphere(point, self.radius)
    }

    /// Whether level geometry is clear between the eye and `point`
    pub fn has_line_of_sight(&self, point: Vec3) -> bool {
        let delta = point - self.eye;
        let options = RaycastOptions::default()
            .with_max_distance(delta.length())
            .with_filter(CollisionGroups::level_only());

        match self.physics.raycast_with(self.eye, delta, &options) {
            None => true,
            Some(hit) => is_same_entity(hit.user_data, self.target_tag),
        }
    }

    /// In frustum and not occluded
    pub fn can_see(&self, point: Vec3) -> bool {
        self.in_frustum(point) && self.has_line_of_sight(point)
    }
}

/// Tags carry the entity id in their low 64 bits; 0 is untagged
fn is_same_entity(hit_tag: u128, target_tag: u128) -> bool {
    let target = target_tag as u64;
    target != 0 && hit_tag as u64 == target
}

/// One frame's measurements between player and antagonist
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub distance: f32,
    /// Unit vector from antagonist to player
    pub direction: Vec3,
    pub in_frustum: bool,
    pub visible: bool,
    pub detection: Detection,
}

/// Measure and classify the antagonist at `antagonist` against the player
pub fn observe(
    config: &AntagonistConfig,
    sightline: &Sightline<'_>,
    player_position: Vec3,
    antagonist: Vec3,
) -> Observation {
    let offset = player_position - antagonist;
    let distance = offset.length();
    let in_frustum = sightline.in_frustum(antagonist);
    // Frustum alone sees through walls
    let visible = in_frustum && sightline.has_line_of_sight(antagonist);

    Observation {
        distance,
        direction: offset.normalize_or_zero(),
        in_frustum,
        visible,
        detection: classify(config, distance, visible),
    }
}
