//! Kinematic character controller for the player capsule
//!
//! The capsule is a parentless collider in the [`CollisionLayer::CHARACTER`]
//! group. It is never pushed by the solver; each fixed step the controller
//! turns the requested walk velocity and its own vertical velocity into a
//! desired translation, and rapier's [`KinematicCharacterController`] resolves
//! that translation against level geometry.
//!
//! [`CollisionLayer::CHARACTER`]: crate::layers::CollisionLayer::CHARACTER

use crate::config::CharacterConfig;
use crate::layers::CollisionGroups;
use glam::Vec3;
use rapier3d::control::{
    CharacterAutostep, CharacterLength, EffectiveCharacterMovement, KinematicCharacterController,
};
use rapier3d::prelude as rapier;

/// Movement state of the player capsule
pub struct CharacterController {
    config: CharacterConfig,
    controller: KinematicCharacterController,
    pub(crate) collider: rapier::ColliderHandle,
    pub(crate) shape: rapier::SharedShape,
    walk_velocity: Vec3,
    vertical_velocity: f32,
    jump_requested: bool,
    grounded: bool,
    last_desired_rise: f32,
}

impl CharacterController {
    pub(crate) fn new(
        config: CharacterConfig,
        collider: rapier::ColliderHandle,
        shape: rapier::SharedShape,
    ) -> Self {
        let slope = config.max_slope_degrees.to_radians();
        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(config.skin_width),
            slide: true,
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(config.step_height),
                min_width: CharacterLength::Absolute(0.2),
                include_dynamic_bodies: false,
            }),
            max_slope_climb_angle: slope,
            min_slope_slide_angle: slope,
            snap_to_ground: Some(CharacterLength::Absolute(config.snap_to_ground)),
            ..Default::default()
        };

        Self {
            config,
            controller,
            collider,
            shape,
            walk_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            jump_requested: false,
            grounded: false,
            last_desired_rise: 0.0,
        }
    }

    /// Tuning this controller was created with
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// Set the horizontal walk velocity (units per second). The vertical
    /// component is ignored; gravity and jumping own the Y axis.
    pub fn set_walk_velocity(&mut self, velocity: Vec3) {
        self.walk_velocity = Vec3::new(velocity.x, 0.0, velocity.z);
    }

    /// Current requested walk velocity
    pub fn walk_velocity(&self) -> Vec3 {
        self.walk_velocity
    }

    /// Ask for a jump on the next grounded step
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Whether the last step ended on walkable ground
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Current vertical speed (positive is up)
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Translation wanted for one fixed step of length `dt`
    pub(crate) fn desired_translation(&mut self, dt: f32) -> rapier::Vector<f32> {
        if self.jump_requested {
            self.jump_requested = false;
            if self.grounded {
                self.vertical_velocity = self.config.launch_speed();
                self.grounded = false;
            }
        }

        self.vertical_velocity =
            (self.vertical_velocity - self.config.gravity * dt).max(-self.config.fall_speed_cap);
        self.last_desired_rise = self.vertical_velocity * dt;

        rapier::Vector::new(
            self.walk_velocity.x * dt,
            self.last_desired_rise,
            self.walk_velocity.z * dt,
        )
    }

    /// Fold the resolved movement back into the velocity state
    pub(crate) fn apply_movement(&mut self, movement: &EffectiveCharacterMovement) {
        self.grounded = movement.grounded;

        if self.grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = 0.0;
        }
        // Head bump: the rise was blocked
        if self.last_desired_rise > 0.0 && movement.translation.y <= 0.0 {
            self.vertical_velocity = 0.0;
        }
    }

    /// Resolve one step against the world and return the applied translation
    pub(crate) fn resolve(
        &self,
        dt: f32,
        bodies: &rapier::RigidBodySet,
        colliders: &rapier::ColliderSet,
        query_pipeline: &rapier::QueryPipeline,
        position: &rapier::Isometry<f32>,
        desired: rapier::Vector<f32>,
    ) -> EffectiveCharacterMovement {
        let filter = rapier::QueryFilter::new()
            .groups(CollisionGroups::character().to_rapier())
            .exclude_collider(self.collider)
            .exclude_sensors();

        // Snapping would pull a rising capsule straight back onto the floor
        let mut controller = self.controller;
        if self.vertical_velocity > 0.0 {
            controller.snap_to_ground = None;
        }

        controller.move_shape(
            dt,
            bodies,
            colliders,
            query_pipeline,
            &*self.shape,
            position,
            desired,
            filter,
            |_| {},
        )
    }
}
