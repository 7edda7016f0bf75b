//! Per-frame antagonist controller

use crate::aggression::{aggression_ratio, aggression_value, roll_teleport};
use crate::config::{AntagonistConfig, SpawnPolicy};
use crate::error::{AiError, Result};
use crate::exposure::{advance_look_time, damage_per_tick};
use crate::frustum::Frustum;
use crate::perception::{facing_yaw, observe, Detection, Observation, Sightline};
use crate::placement::{pick_spawn_point, search_region};
use crate::state::{AntagonistState, PlayerState};
use glam::Vec3;
use pines_physics::PhysicsWorld;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Antagonist transform the controller writes to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntagonistBody {
    /// Centre of the antagonist
    pub position: Vec3,
    /// Rotation about Y
    pub yaw: f32,
}

impl AntagonistBody {
    pub fn at(position: Vec3) -> Self {
        Self { position, yaw: 0.0 }
    }
}

/// Inputs for one update, all from the current frame
pub struct AntagonistFrame<'a> {
    pub player_position: Vec3,
    pub player_eye: Vec3,
    /// Frustum built from this frame's camera
    pub frustum: &'a Frustum,
    pub physics: &'a PhysicsWorld,
    pub delta_time: f32,
}

/// Result of a teleport opportunity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportOutcome {
    /// Cooldown running or the player is detected
    NotEligible,
    /// The aggression roll failed
    Declined { draw: i32, aggression: i32 },
    /// The roll passed but no destination qualified
    NoValidSpawn,
    /// Moved to the given position
    Teleported(Vec3),
}

/// What one update did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub observation: Observation,
    pub damage: f32,
    pub teleport: TeleportOutcome,
}

/// Drives one antagonist against one player
pub struct AntagonistController {
    config: AntagonistConfig,
    state: AntagonistState,
    player: u64,
    antagonist: u64,
    rng: StdRng,
    game_time: f32,
    player_dead: bool,
}

impl AntagonistController {
    /// Bind to the player and antagonist entities, seeding from the OS
    pub fn new(config: AntagonistConfig, player: Option<u64>, antagonist: Option<u64>) -> Result<Self> {
        Self::with_rng(config, player, antagonist, StdRng::from_os_rng())
    }

    /// Bind with an explicit random source
    pub fn with_rng(
        config: AntagonistConfig,
        player: Option<u64>,
        antagonist: Option<u64>,
        rng: StdRng,
    ) -> Result<Self> {
        let player = player.ok_or(AiError::MissingEntity("player"))?;
        let antagonist = antagonist.ok_or(AiError::MissingEntity("antagonist"))?;
        config.validate()?;

        log::info!(
            "Antagonist {} bound to player {} (detection {}, close {}, cooldown {}s)",
            antagonist,
            player,
            config.detection_distance,
            config.close_distance,
            config.teleport_cooldown
        );

        Ok(Self {
            state: AntagonistState::new(&config),
            config,
            player,
            antagonist,
            rng,
            game_time: 0.0,
            player_dead: false,
        })
    }

    pub fn config(&self) -> &AntagonistConfig {
        &self.config
    }

    pub fn state(&self) -> &AntagonistState {
        &self.state
    }

    pub fn player_entity(&self) -> u64 {
        self.player
    }

    pub fn antagonist_entity(&self) -> u64 {
        self.antagonist
    }

    /// Seconds of play so far
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Aggression as of the last update
    pub fn aggression(&self) -> i32 {
        self.state.current_ai_value
    }

    /// True once the player's health has reached zero. The controller makes
    /// no state transition on death.
    pub fn player_is_dead(&self) -> bool {
        self.player_dead
    }

    /// Scale the teleport cooldown (page pickups shorten it)
    pub fn scale_teleport_cooldown(&mut self, factor: f32) {
        self.state.teleport_cooldown = (self.state.teleport_cooldown * factor).max(0.0);
        log::debug!("Teleport cooldown now {:.2}s", self.state.teleport_cooldown);
    }

    /// Run one frame
    pub fn update(
        &mut self,
        frame: &AntagonistFrame<'_>,
        body: &mut AntagonistBody,
        player: &mut PlayerState,
    ) -> FrameReport {
        let dt = frame.delta_time.max(0.0);
        self.game_time += dt;
        self.state.current_ai_value = aggression_value(&self.config, player.pages_collected, self.game_time);

        // Always face the player
        body.yaw = facing_yaw(body.position, frame.player_position);

        let sightline = Sightline::new(
            frame.physics,
            frame.frustum,
            frame.player_eye,
            self.config.bounding_radius,
            u128::from(self.antagonist),
        );
        let observation = observe(&self.config, &sightline, frame.player_position, body.position);
        let detection = observation.detection;
        player.distance_to_antagonist = observation.distance;

        if detection != self.state.last_detection {
            log::debug!(
                "Detection {:?} -> {:?} at {:.1}m",
                self.state.last_detection,
                detection,
                observation.distance
            );
            self.state.last_detection = detection;
        }

        player.look_time = advance_look_time(player.look_time, detection, dt);
        let damage = damage_per_tick(&self.config, detection, observation.distance, player.look_time, dt);
        player.apply_damage(damage);
        if detection == Detection::Neither {
            player.regenerate(dt);
        }

        let teleport = self.teleport_cycle(dt, detection, frame.player_position, &sightline, body);

        if player.is_dead() && !self.player_dead {
            log::info!("Player health depleted after {:.1}s", self.game_time);
        }
        self.player_dead = player.is_dead();

        FrameReport {
            observation,
            damage,
            teleport,
        }
    }

    fn teleport_cycle(
        &mut self,
        dt: f32,
        detection: Detection,
        player_position: Vec3,
        sightline: &Sightline<'_>,
        body: &mut AntagonistBody,
    ) -> TeleportOutcome {
        self.state.teleport_timer += dt;
        if detection.is_detected() || self.state.teleport_timer < self.state.teleport_cooldown {
            return TeleportOutcome::NotEligible;
        }
        self.state.teleport_timer = 0.0;

        let aggression = self.state.current_ai_value;
        let (draw, teleport) = roll_teleport(&mut self.rng, &self.config, aggression);
        if !teleport {
            log::debug!("Teleport declined (draw {} > aggression {})", draw, aggression);
            return TeleportOutcome::Declined { draw, aggression };
        }

        let ratio = aggression_ratio(&self.config, aggression);
        let destination = match &self.config.spawn {
            SpawnPolicy::SpawnPoints { points } => {
                pick_spawn_point(&mut self.rng, &self.config, points, player_position, ratio, sightline)
            }
            SpawnPolicy::Region(region) => {
                search_region(&mut self.rng, &self.config, region, player_position, ratio, sightline)
            }
        };

        match destination {
            Some(position) => {
                body.position = position;
                body.yaw = facing_yaw(position, player_position);
                log::info!(
                    "Antagonist teleported to ({:.1}, {:.1}, {:.1}), aggression {}",
                    position.x,
                    position.y,
                    position.z,
                    aggression
                );
                TeleportOutcome::Teleported(position)
            }
            None => TeleportOutcome::NoValidSpawn,
        }
    }
}
