//! The level's collision world
//!
//! Static level bodies, pickup volumes and the player capsule live in one
//! rapier simulation. Everything here is a no-op or a miss until the world
//! is initialized, so systems may query during staged loading.

use crate::character::CharacterController;
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::layers::CollisionGroups;
use crate::mesh::StaticMesh;
use crate::query::{PhysicsQuery, RaycastHit, RaycastOptions};
use glam::{Mat4, Vec3};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// Handle to an immovable body registered in the static world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticBodyHandle(pub rapier::RigidBodyHandle);

/// All rapier state. Absent while the world is detached or destroyed.
struct Simulation {
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    query_pipeline: rapier::QueryPipeline,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    static_bodies: Vec<StaticBodyHandle>,
    character: Option<CharacterController>,
    accumulated_time: f32,
}

impl Simulation {
    fn new(config: &PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        if let Some(iterations) = NonZeroUsize::new(config.solver_iterations) {
            integration_params.num_solver_iterations = iterations;
        }

        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            static_bodies: Vec::new(),
            character: None,
            accumulated_time: 0.0,
        }
    }

    fn insert_static(&mut self, collider: rapier::ColliderBuilder, position: Vec3, tag: u128) -> StaticBodyHandle {
        let body = rapier::RigidBodyBuilder::fixed()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .user_data(tag)
            .build();
        let body_handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider.user_data(tag).build(), body_handle, &mut self.bodies);

        self.query_pipeline.update(&self.colliders);

        let handle = StaticBodyHandle(body_handle);
        self.static_bodies.push(handle);
        handle
    }

    fn remove_static(&mut self, handle: StaticBodyHandle) -> bool {
        let removed = self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.static_bodies.retain(|h| *h != handle);
        removed.is_some()
    }

    /// One fixed step: pipeline first so queries see this step's world, then the capsule
    fn step_fixed(&mut self, dt: f32) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        let Some(character) = self.character.as_mut() else {
            return;
        };
        let Some(position) = self.colliders.get(character.collider).map(|c| *c.position()) else {
            return;
        };

        let desired = character.desired_translation(dt);
        let movement = character.resolve(
            dt,
            &self.bodies,
            &self.colliders,
            &self.query_pipeline,
            &position,
            desired,
        );
        character.apply_movement(&movement);

        if let Some(collider) = self.colliders.get_mut(character.collider) {
            collider.set_translation(position.translation.vector + movement.translation);
        }
    }
}

/// The collision world for one play session
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Simulation state, `None` until initialized or after destroy
    sim: Option<Simulation>,
}

impl PhysicsWorld {
    /// Create an initialized physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let mut world = Self::detached(config);
        world.initialize();
        world
    }

    /// Create a world whose simulation is not set up yet.
    ///
    /// Raycasts return no hit and movement calls are ignored until
    /// [`initialize`](Self::initialize) runs.
    pub fn detached(config: PhysicsConfig) -> Self {
        Self { config, sim: None }
    }

    /// Bring up the simulation. No-op if already initialized.
    pub fn initialize(&mut self) {
        if self.sim.is_some() {
            return;
        }
        self.sim = Some(Simulation::new(&self.config));
        log::info!(
            "Physics world initialized (timestep {:.4}s, max {} substeps)",
            self.config.timestep,
            self.config.max_substeps
        );
    }

    /// Release all simulation state; the world reverts to the detached state
    pub fn destroy(&mut self) {
        if let Some(sim) = self.sim.take() {
            log::info!(
                "Physics world destroyed ({} static bodies, character: {})",
                sim.static_bodies.len(),
                sim.character.is_some()
            );
        }
    }

    /// Whether the simulation exists
    pub fn is_initialized(&self) -> bool {
        self.sim.is_some()
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // Level geometry

    /// Bake a mesh into world space and register it as one static body
    pub fn add_static_mesh(&mut self, mesh: &StaticMesh, transform: Mat4, tag: u128) -> Result<StaticBodyHandle> {
        let Some(sim) = self.sim.as_mut() else {
            return Err(PhysicsError::InvalidConfig(
                "physics world is not initialized".to_string(),
            ));
        };

        let indices = mesh.valid_indices();
        if mesh.vertices.is_empty() || indices.is_empty() {
            return Err(PhysicsError::EmptyMesh(mesh.name.clone()));
        }

        let collider = rapier::ColliderBuilder::trimesh(mesh.world_points(&transform), indices)
            .collision_groups(CollisionGroups::level().to_rapier());

        let handle = sim.insert_static(collider, Vec3::ZERO, tag);
        log::debug!(
            "Static mesh '{}' registered ({} triangles, tag {})",
            mesh.name,
            mesh.triangle_count(),
            tag
        );
        Ok(handle)
    }

    /// Register one static body per instance transform of the same mesh
    pub fn add_instanced_mesh(
        &mut self,
        mesh: &StaticMesh,
        instances: &[Mat4],
        tag: u128,
    ) -> Result<Vec<StaticBodyHandle>> {
        instances
            .iter()
            .map(|transform| self.add_static_mesh(mesh, *transform, tag))
            .collect()
    }

    /// Register an immovable sphere in the pickup layer
    pub fn add_static_sphere(&mut self, center: Vec3, radius: f32, tag: u128) -> Result<StaticBodyHandle> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        let Some(sim) = self.sim.as_mut() else {
            return Err(PhysicsError::InvalidConfig(
                "physics world is not initialized".to_string(),
            ));
        };

        let collider = rapier::ColliderBuilder::ball(radius)
            .collision_groups(CollisionGroups::interactable().to_rapier());
        Ok(sim.insert_static(collider, center, tag))
    }

    /// Register an immovable box in the level layer
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3, tag: u128) -> Result<StaticBodyHandle> {
        if half_extents.min_element() <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "box half extents must be positive, got {half_extents:?}"
            )));
        }
        let Some(sim) = self.sim.as_mut() else {
            return Err(PhysicsError::InvalidConfig(
                "physics world is not initialized".to_string(),
            ));
        };

        let collider = rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(CollisionGroups::level().to_rapier());
        Ok(sim.insert_static(collider, center, tag))
    }

    /// Remove one static body and its collider
    pub fn remove_body(&mut self, handle: StaticBodyHandle) -> Result<()> {
        let Some(sim) = self.sim.as_mut() else {
            return Err(PhysicsError::BodyNotFound(handle));
        };
        if !sim.remove_static(handle) {
            return Err(PhysicsError::BodyNotFound(handle));
        }
        sim.query_pipeline.update(&sim.colliders);
        Ok(())
    }

    /// Drop every static body so the level can be rebuilt from scratch
    pub fn clear_static_world(&mut self) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        let handles = std::mem::take(&mut sim.static_bodies);
        let count = handles.len();
        for handle in handles {
            sim.remove_static(handle);
        }
        sim.query_pipeline.update(&sim.colliders);
        log::info!("Cleared {} static bodies", count);
    }

    /// Number of registered static bodies
    pub fn static_body_count(&self) -> usize {
        self.sim.as_ref().map_or(0, |sim| sim.static_bodies.len())
    }

    /// Sync the query pipeline with current colliders.
    /// Call this after building the level if you need to query before the first update().
    pub fn sync_query_pipeline(&mut self) {
        if let Some(sim) = self.sim.as_mut() {
            sim.query_pipeline.update(&sim.colliders);
        }
    }

    // Player capsule

    /// Create the player capsule at `position`.
    ///
    /// `height` is the full standing height; the cylindrical section is
    /// `height - 2 * radius`. A second call while a capsule exists does
    /// nothing.
    pub fn initialize_player_collider(&mut self, position: Vec3, radius: f32, height: f32) -> Result<()> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "capsule radius must be positive, got {radius}"
            )));
        }
        let Some(sim) = self.sim.as_mut() else {
            log::warn!("Player collider requested before physics initialization; ignored");
            return Ok(());
        };
        if sim.character.is_some() {
            return Ok(());
        }

        let half_height = ((height - 2.0 * radius) * 0.5).max(0.0);
        let shape = rapier::SharedShape::capsule_y(half_height, radius);
        let collider = rapier::ColliderBuilder::new(shape.clone())
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .collision_groups(CollisionGroups::character().to_rapier())
            .build();
        let handle = sim.colliders.insert(collider);
        sim.query_pipeline.update(&sim.colliders);

        sim.character = Some(CharacterController::new(self.config.character.clone(), handle, shape));
        log::info!(
            "Player collider created at ({:.2}, {:.2}, {:.2}), radius {}, height {}",
            position.x,
            position.y,
            position.z,
            radius,
            height
        );
        Ok(())
    }

    /// Whether the player capsule exists
    pub fn has_player(&self) -> bool {
        self.sim.as_ref().is_some_and(|sim| sim.character.is_some())
    }

    /// Set the desired walk velocity (units per second) applied during [`update`](Self::update)
    pub fn move_player(&mut self, velocity: Vec3) {
        if let Some(character) = self.character_mut() {
            character.set_walk_velocity(velocity);
        }
    }

    /// Request a jump; honoured on the next grounded step
    pub fn jump(&mut self) {
        if let Some(character) = self.character_mut() {
            character.request_jump();
        }
    }

    /// Centre of the player capsule
    pub fn player_position(&self) -> Option<Vec3> {
        let sim = self.sim.as_ref()?;
        let character = sim.character.as_ref()?;
        let t = sim.colliders.get(character.collider)?.translation();
        Some(Vec3::new(t.x, t.y, t.z))
    }

    /// Whether the capsule ended the last step on the ground
    pub fn is_grounded(&self) -> bool {
        self.character().is_some_and(|c| c.is_grounded())
    }

    /// Read access to the character controller
    pub fn character(&self) -> Option<&CharacterController> {
        self.sim.as_ref()?.character.as_ref()
    }

    fn character_mut(&mut self) -> Option<&mut CharacterController> {
        self.sim.as_mut()?.character.as_mut()
    }

    // Stepping

    /// Advance the world by a frame's `delta_time` in fixed steps
    pub fn update(&mut self, delta_time: f32) {
        let timestep = self.config.timestep;
        let max_substeps = self.config.max_substeps;
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }

        sim.accumulated_time += delta_time;

        let mut steps = 0;
        while sim.accumulated_time >= timestep && steps < max_substeps {
            sim.step_fixed(timestep);
            sim.accumulated_time -= timestep;
            steps += 1;
        }

        // Long frames drop the backlog instead of spiralling
        if steps == max_substeps && sim.accumulated_time >= timestep {
            log::debug!(
                "Physics dropped {:.3}s of backlog after {} substeps",
                sim.accumulated_time,
                steps
            );
            sim.accumulated_time = 0.0;
        }

        sim.query_pipeline.update(&sim.colliders);
    }

    // Raycasts

    /// Get a query interface, if the world is initialized
    pub fn query(&self) -> Option<PhysicsQuery<'_>> {
        let sim = self.sim.as_ref()?;
        Some(PhysicsQuery {
            pipeline: &sim.query_pipeline,
            colliders: &sim.colliders,
            bodies: &sim.bodies,
        })
    }

    /// Closest hit on the segment `from -> to`; `fraction` runs 0..1 along it
    pub fn raycast(&self, from: Vec3, to: Vec3) -> Option<RaycastHit> {
        let delta = to - from;
        let length = delta.length();
        let options = RaycastOptions::default().with_max_distance(length);
        self.raycast_with(from, delta, &options)
    }

    /// Closest hit along `direction` within `max_distance`
    pub fn raycast_toward(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let options = RaycastOptions::default().with_max_distance(max_distance);
        self.raycast_with(origin, direction, &options)
    }

    /// Closest hit with explicit options
    pub fn raycast_with(&self, origin: Vec3, direction: Vec3, options: &RaycastOptions) -> Option<RaycastHit> {
        self.query()?.raycast(origin, direction, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_world() {
        let world = PhysicsWorld::new(PhysicsConfig::default());
        assert!(world.is_initialized());
        assert_eq!(world.static_body_count(), 0);
        assert!(!world.has_player());
    }

    #[test]
    fn test_detached_world_is_inert() {
        let mut world = PhysicsWorld::detached(PhysicsConfig::default());
        world.move_player(Vec3::X);
        world.update(1.0 / 60.0);

        assert!(world.raycast(Vec3::Y, Vec3::NEG_Y).is_none());
        assert!(world.player_position().is_none());
        assert!(world.initialize_player_collider(Vec3::ZERO, 0.4, 1.8).is_ok());
        assert!(!world.has_player());
    }

    #[test]
    fn test_static_mesh_requires_triangles() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let empty = StaticMesh::new("nothing", Vec::new(), Vec::new());
        assert!(matches!(
            world.add_static_mesh(&empty, Mat4::IDENTITY, 1),
            Err(PhysicsError::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_remove_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let handle = world.add_static_box(Vec3::ZERO, Vec3::ONE, 3).unwrap();
        assert_eq!(world.static_body_count(), 1);

        world.remove_body(handle).unwrap();
        assert_eq!(world.static_body_count(), 0);
        assert!(world.remove_body(handle).is_err());
    }

    #[test]
    fn test_destroy_reverts_to_detached() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        world.add_static_box(Vec3::ZERO, Vec3::ONE, 3).unwrap();
        world.sync_query_pipeline();
        assert!(world.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO).is_some());

        world.destroy();
        assert!(!world.is_initialized());
        assert!(world.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO).is_none());
    }

    #[test]
    fn test_new_bodies_are_raycastable_at_once() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        world.add_static_box(Vec3::ZERO, Vec3::ONE, 77).unwrap();
        let hit = world.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -5.0, 0.0)).unwrap();
        assert_eq!(hit.user_data, 77);

        world
            .add_static_mesh(&StaticMesh::plane("floor", 10.0), Mat4::from_translation(Vec3::new(20.0, 0.0, 0.0)), 5)
            .unwrap();
        let hit = world.raycast(Vec3::new(20.0, 5.0, 0.0), Vec3::new(20.0, -5.0, 0.0)).unwrap();
        assert_eq!(hit.user_data, 5);
    }
}
