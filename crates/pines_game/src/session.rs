//! The play session frame loop
//!
//! A [`PlaySession`] owns every runtime system of one level and advances
//! them in a fixed order each frame:
//!
//! 1. input becomes movement intent
//! 2. physics steps the capsule
//! 3. the camera follows the capsule
//! 4. the frustum is rebuilt from this frame's camera
//! 5. the antagonist perceives, hurts and maybe teleports
//! 6. page interaction
//! 7. audio directors and crossfades
//! 8. win/death check

use crate::component::{Component, ComponentKind};
use crate::config::GameConfig;
use crate::directors::{AmbientDirector, FootstepDirector, StaticDirector, SurfaceRegistry};
use crate::error::{GameError, Result};
use crate::pages::PageSystem;
use crate::player::{PlayerInput, PlayerRig};
use crate::scene::{EntityId, Scene};
use glam::{Mat4, Vec3};
use pines_ai::{AntagonistBody, AntagonistController, AntagonistFrame, FrameReport, PlayerState};
use pines_audio::{AudioBackend, AudioChannel, ChannelPurpose};
use pines_physics::{PhysicsWorld, StaticMesh};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Collision geometry by mesh name; each entry lists its submeshes
pub type MeshLibrary = HashMap<String, Vec<StaticMesh>>;

/// Where the session stands after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    /// Every page collected
    Won,
    /// Player health reached zero
    Died,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Playing => write!(f, "playing"),
            Outcome::Won => write!(f, "won"),
            Outcome::Died => write!(f, "died"),
        }
    }
}

/// Strength of the renderer's static-noise overlay: 0 at full health, 1 at death
pub fn static_intensity(health_fraction: f32) -> f32 {
    (1.0 - health_fraction).clamp(0.0, 1.0)
}

/// One level being played
pub struct PlaySession {
    // Audio first: it is torn down before physics and the scene
    ambient: AmbientDirector,
    static_noise: StaticDirector,
    footsteps: FootstepDirector,
    stinger: AudioChannel,
    physics: PhysicsWorld,
    surfaces: SurfaceRegistry,
    pages: PageSystem,
    ai: AntagonistController,
    rig: PlayerRig,
    player_state: PlayerState,
    antagonist_body: AntagonistBody,
    scene: Scene,
    player: EntityId,
    antagonist: EntityId,
    config: GameConfig,
    outcome: Outcome,
    last_report: Option<FrameReport>,
}

impl PlaySession {
    /// Wire every system for `scene`.
    ///
    /// Fails when the scene has no player or no antagonist, or when level
    /// geometry cannot be turned into collision shapes.
    pub fn new(
        config: GameConfig,
        mut scene: Scene,
        meshes: &MeshLibrary,
        backend: Rc<dyn AudioBackend>,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;

        let player = scene.find_with(ComponentKind::Player).ok_or(GameError::MissingEntity("player"))?;
        let antagonist = scene
            .find_with(ComponentKind::Antagonist)
            .ok_or(GameError::MissingEntity("antagonist"))?;

        // Static world
        let mut physics = PhysicsWorld::new(config.physics.clone());
        let mut surfaces = SurfaceRegistry::new();
        let bodies = build_static_world(&scene, meshes, &mut physics, &mut surfaces)?;
        log::info!("Static world built: {} bodies, {} tile surfaces", bodies, surfaces.len());

        // Player capsule
        let player_origin = entity_position(&scene, player);
        let spawn = player_origin + Vec3::Y * config.camera.spawn_offset;
        physics.initialize_player_collider(spawn, config.camera.capsule_radius, config.camera.capsule_height)?;
        let rig = PlayerRig::new(config.camera.clone(), &config.player, spawn);
        let player_state = PlayerState::new(&config.player);

        // Antagonist
        let ai = AntagonistController::with_rng(
            config.antagonist.clone(),
            Some(player.get()),
            Some(antagonist.get()),
            StdRng::from_rng(&mut rng),
        )?;
        let antagonist_body = AntagonistBody::at(entity_position(&scene, antagonist));

        // Pages
        let spawner = scene
            .iter_with(ComponentKind::PageSpawner)
            .find_map(|e| match e.component(ComponentKind::PageSpawner) {
                Some(Component::PageSpawner(spawner)) => Some(spawner.clone()),
                _ => None,
            });
        let pages = match spawner {
            Some(spawner) => PageSystem::spawn(
                config.pages.clone(),
                &mut scene,
                &mut physics,
                &spawner.spawn_points,
                spawner.total_pages,
                &mut rng,
            )?,
            None => {
                log::warn!("Scene has no page spawner; playing without pages");
                PageSystem::empty(config.pages.clone())
            }
        };
        physics.sync_query_pipeline();

        // Audio
        for entity in scene.iter_with(ComponentKind::AudioSource) {
            for component in &entity.components {
                if let Component::AudioSource { purpose } = component {
                    log::debug!("{} channel attached to '{}'", purpose, entity.name);
                }
            }
        }
        let channel = |purpose| AudioChannel::new(purpose, Rc::clone(&backend), config.audio.gain_for(purpose));
        let mut ambient = AmbientDirector::new(channel(ChannelPurpose::Ambience));
        let static_noise = StaticDirector::new(channel(ChannelPurpose::Static));
        let footsteps = FootstepDirector::new(channel(ChannelPurpose::Footsteps), config.footsteps.clone());
        let stinger = channel(ChannelPurpose::Stinger);

        ambient.update(
            0.0,
            ai.aggression(),
            config.antagonist.min_ai_value,
            config.antagonist.max_ai_value,
        );

        log::info!(
            "Play session ready ({} pages, audio backend '{}')",
            pages.total(),
            backend.name()
        );

        Ok(Self {
            ambient,
            static_noise,
            footsteps,
            stinger,
            physics,
            surfaces,
            pages,
            ai,
            rig,
            player_state,
            antagonist_body,
            scene,
            player,
            antagonist,
            config,
            outcome: Outcome::Playing,
            last_report: None,
        })
    }

    /// Run one frame. Once the session is won or lost it stays that way and
    /// further calls do nothing.
    pub fn update(&mut self, delta_time: f32, input: &PlayerInput) -> Outcome {
        if self.outcome != Outcome::Playing {
            return self.outcome;
        }
        let dt = delta_time.max(0.0);

        let velocity = self.rig.apply_input(input, &mut self.player_state, dt);
        self.physics.move_player(velocity);
        if input.jump {
            self.physics.jump();
        }

        self.physics.update(dt);

        if let Some(position) = self.physics.player_position() {
            self.rig.sync(position);
        }
        if let Some(entity) = self.scene.get_mut(self.player) {
            entity.transform.position = self.rig.position();
            entity.transform.rotation.y = self.rig.yaw();
        }

        let frustum = self.rig.frustum();

        let frame = AntagonistFrame {
            player_position: self.rig.position(),
            player_eye: self.rig.eye(),
            frustum: &frustum,
            physics: &self.physics,
            delta_time: dt,
        };
        let report = self.ai.update(&frame, &mut self.antagonist_body, &mut self.player_state);
        if let Some(entity) = self.scene.get_mut(self.antagonist) {
            entity.transform.position = self.antagonist_body.position;
            entity.transform.rotation.y = self.antagonist_body.yaw;
        }
        self.last_report = Some(report);

        if input.interact {
            self.interact();
        }

        let antagonist = &self.config.antagonist;
        self.ambient
            .update(dt, self.ai.aggression(), antagonist.min_ai_value, antagonist.max_ai_value);
        self.static_noise.update(dt, self.player_state.health_fraction());
        let surface = self
            .surfaces
            .classify(&self.physics, self.rig.position(), self.footsteps.config().feet_probe);
        self.footsteps.update(dt, &self.player_state, surface);
        self.stinger.update_crossfade(dt);

        self.outcome = if self.pages.all_collected() {
            Outcome::Won
        } else if self.ai.player_is_dead() {
            Outcome::Died
        } else {
            Outcome::Playing
        };
        if self.outcome != Outcome::Playing {
            log::info!(
                "Session {} after {:.1}s with {}/{} pages",
                self.outcome,
                self.ai.game_time(),
                self.pages.collected(),
                self.pages.total()
            );
        }
        self.outcome
    }

    fn interact(&mut self) {
        let eye = self.rig.eye();
        let direction = self.rig.look_direction();
        let Some(page) = self
            .pages
            .try_interact(&mut self.physics, eye, direction, &mut self.player_state)
        else {
            return;
        };

        self.ai.scale_teleport_cooldown(self.pages.config().cooldown_factor);
        let clip = self.pages.config().pickup_clip.clone();
        let volume = self.pages.config().pickup_volume;
        // Failure already logged by the channel
        let _ = self.stinger.play_one_shot(&clip, volume);
        self.scene.despawn(page);
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_state(&self) -> &PlayerState {
        &self.player_state
    }

    pub fn player_state_mut(&mut self) -> &mut PlayerState {
        &mut self.player_state
    }

    pub fn rig(&self) -> &PlayerRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut PlayerRig {
        &mut self.rig
    }

    pub fn antagonist(&self) -> &AntagonistController {
        &self.ai
    }

    pub fn antagonist_body(&self) -> &AntagonistBody {
        &self.antagonist_body
    }

    pub fn player_entity(&self) -> EntityId {
        self.player
    }

    pub fn antagonist_entity(&self) -> EntityId {
        self.antagonist
    }

    /// What the antagonist did in the last frame
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn pages(&self) -> &PageSystem {
        &self.pages
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn ambience(&self) -> &AudioChannel {
        self.ambient.channel()
    }

    pub fn static_channel(&self) -> &AudioChannel {
        self.static_noise.channel()
    }

    pub fn footstep_channel(&self) -> &AudioChannel {
        self.footsteps.channel()
    }

    pub fn stinger(&self) -> &AudioChannel {
        &self.stinger
    }

    /// Static overlay strength for the renderer
    pub fn static_intensity(&self) -> f32 {
        static_intensity(self.player_state.health_fraction())
    }
}

impl Drop for PlaySession {
    fn drop(&mut self) {
        self.ambient.channel_mut().stop_music();
        self.static_noise.channel_mut().stop_music();
        self.footsteps.channel_mut().stop_music();
        self.stinger.stop_music();
        self.physics.destroy();
        self.scene.clear();
        log::info!("Play session torn down");
    }
}

fn entity_position(scene: &Scene, id: EntityId) -> Vec3 {
    scene.get(id).map_or(Vec3::ZERO, |e| e.transform.position)
}

/// Register one static body per submesh (and per instance) of every
/// mesh-rendering entity. The antagonist moves, so its mesh is render-only.
fn build_static_world(
    scene: &Scene,
    meshes: &MeshLibrary,
    physics: &mut PhysicsWorld,
    surfaces: &mut SurfaceRegistry,
) -> Result<usize> {
    let mut bodies = 0;
    for entity in scene.iter_with(ComponentKind::MeshRenderer) {
        if entity.has(ComponentKind::Antagonist) {
            continue;
        }
        let Some(Component::MeshRenderer(renderer)) = entity.component(ComponentKind::MeshRenderer) else {
            continue;
        };
        let Some(submeshes) = meshes.get(&renderer.mesh) else {
            log::warn!("Entity '{}' references unknown mesh '{}'", entity.name, renderer.mesh);
            continue;
        };

        let base = entity.transform.matrix();
        let transforms: Vec<Mat4> = if renderer.instances.is_empty() {
            vec![base]
        } else {
            renderer.instances.iter().map(|t| base * t.matrix()).collect()
        };

        for (index, submesh) in submeshes.iter().enumerate() {
            if submesh.is_empty() {
                log::debug!("Skipping empty submesh '{}'", submesh.name);
                continue;
            }
            let tag = entity.id.submesh_tag(index);
            bodies += physics.add_instanced_mesh(submesh, &transforms, tag)?.len();
            surfaces.register_mesh(tag, &submesh.name);
        }
    }
    physics.sync_query_pipeline();
    Ok(bodies)
}
