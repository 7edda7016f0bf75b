//! First-person player rig: look angles, movement intent and camera

use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3};
use pines_ai::{Frustum, PlayerConfig, PlayerState};
use std::f32::consts::FRAC_PI_2;

/// Pitch limit, just short of straight up or down
const PITCH_LIMIT: f32 = 0.99 * FRAC_PI_2;

/// One frame of player input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Forward/backward axis in [-1, 1]
    pub forward: f32,
    /// Right/left axis in [-1, 1]
    pub right: f32,
    /// Look delta: x turns (yaw), y tilts (pitch)
    pub look: Vec2,
    pub sprint: bool,
    pub jump: bool,
    /// Interact pressed this frame
    pub interact: bool,
}

impl PlayerInput {
    /// Walk straight ahead
    pub fn walk_forward() -> Self {
        Self {
            forward: 1.0,
            ..Self::default()
        }
    }
}

/// Yaw/pitch camera bolted to the player capsule
#[derive(Debug, Clone)]
pub struct PlayerRig {
    camera: CameraConfig,
    walk_speed: f32,
    sprint_multiplier: f32,
    yaw: f32,
    pitch: f32,
    /// Capsule centre as of the last sync
    position: Vec3,
}

impl PlayerRig {
    pub fn new(camera: CameraConfig, player: &PlayerConfig, position: Vec3) -> Self {
        Self {
            camera,
            walk_speed: player.walk_speed,
            sprint_multiplier: player.sprint_multiplier,
            yaw: 0.0,
            pitch: 0.0,
            position,
        }
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set both look angles; pitch is clamped
    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Follow the capsule after physics has moved it
    pub fn sync(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * self.camera.eye_height
    }

    /// Horizontal forward
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal right
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Where the camera points, pitch included
    pub fn look_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-self.yaw.sin() * cos_pitch, sin_pitch, -self.yaw.cos() * cos_pitch)
    }

    /// Turn, update sprint and stamina, and return the walk velocity in
    /// units per second
    pub fn apply_input(&mut self, input: &PlayerInput, state: &mut PlayerState, delta_time: f32) -> Vec3 {
        let turn = input.look * self.camera.look_sensitivity;
        self.set_look(self.yaw - turn.x, self.pitch - turn.y);

        let axes = Vec2::new(input.right, input.forward).clamp_length_max(1.0);
        let direction = self.forward() * axes.y + self.right() * axes.x;
        state.is_moving = direction.length_squared() > 1e-6;

        let sprinting = state.update_stamina(input.sprint, delta_time);
        let speed = if sprinting {
            self.walk_speed * self.sprint_multiplier
        } else {
            self.walk_speed
        };

        direction * speed
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye(), self.look_direction(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.camera.fov_y, self.camera.aspect_ratio, self.camera.near, self.camera.far)
    }

    /// This frame's view frustum
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&(self.projection_matrix() * self.view_matrix()))
    }
}
