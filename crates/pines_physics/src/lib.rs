//! Pines Physics - Rapier 3D collision world
//!
//! This crate provides the collision layer of the game: a static world built
//! from level geometry, one kinematic capsule for the player, and raycasts
//! used by gameplay and the antagonist's sightline checks.
//!
//! # Features
//!
//! - Static triangle-mesh bodies (single meshes and per-instance transforms)
//! - Static primitive bodies (spheres, boxes) for pickup volumes
//! - Kinematic character capsule with gravity, jumping and slope limits
//! - Closest-hit raycasts with opaque tag round-trip
//! - Fixed-timestep accumulation for frame-rate independent movement
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  PhysicsWorld                     │
//! │  ┌──────────────────────────────────────────────┐│
//! │  │ Simulation (absent while detached/destroyed) ││
//! │  │  ┌─────────────┐ ┌─────────────┐ ┌─────────┐ ││
//! │  │  │ RigidBodySet│ │ ColliderSet │ │ Queries │ ││
//! │  │  └─────────────┘ └─────────────┘ └─────────┘ ││
//! │  │  ┌──────────────────────────────────────────┐││
//! │  │  │ CharacterController (zero or one)        │││
//! │  │  └──────────────────────────────────────────┘││
//! │  └──────────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────┘
//!                        │
//!         ┌──────────────┼──────────────┐
//!         ▼              ▼              ▼
//!    ┌──────────┐  ┌───────────┐  ┌───────────┐
//!    │StaticMesh│  │  Capsule  │  │RaycastHit │
//!    └──────────┘  └───────────┘  └───────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pines_physics::prelude::*;
//! use glam::{Mat4, Vec3};
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//! physics.add_static_mesh(&StaticMesh::plane("ground", 50.0), Mat4::IDENTITY, 7)?;
//! physics.initialize_player_collider(Vec3::new(0.0, 2.0, 0.0), 0.4, 1.8)?;
//!
//! physics.move_player(Vec3::new(3.0, 0.0, 0.0));
//! physics.update(1.0 / 60.0);
//!
//! if let Some(hit) = physics.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO) {
//!     assert_eq!(hit.user_data, 7);
//! }
//! ```

pub mod character;
pub mod config;
pub mod error;
pub mod layers;
pub mod mesh;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::character::CharacterController;
    pub use crate::config::{CharacterConfig, PhysicsConfig};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::layers::{CollisionGroups, CollisionLayer};
    pub use crate::mesh::StaticMesh;
    pub use crate::query::{RaycastHit, RaycastOptions};
    pub use crate::world::{PhysicsWorld, StaticBodyHandle};
}

pub use prelude::*;
