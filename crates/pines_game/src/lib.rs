//! Pines Game - the play session
//!
//! Ties the physics, AI and audio crates into a playable level:
//!
//! ```text
//!   PlayerInput ──► PlayerRig ──► PhysicsWorld ──► camera + Frustum
//!                                                        │
//!          AmbientDirector ◄── aggression ◄── AntagonistController
//!          StaticDirector  ◄── health     ◄──────────────┘
//!          FootstepDirector ◄── surface probe
//!          PageSystem ──► stinger, teleport cooldown
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pines_game::prelude::*;
//!
//! let scene = SceneDescription::load("level.json")?.build(&ComponentRegistry::with_builtin())?;
//! let backend = open_default_backend(&config.audio);
//! let mut session = PlaySession::new(config, scene, &meshes, backend, StdRng::from_os_rng())?;
//!
//! loop {
//!     match session.update(delta_time, &input) {
//!         Outcome::Playing => {}
//!         Outcome::Won | Outcome::Died => break,
//!     }
//! }
//! ```

pub mod component;
pub mod config;
pub mod directors;
pub mod error;
pub mod pages;
pub mod player;
pub mod scene;
pub mod session;

pub mod prelude {
    pub use crate::component::{Component, ComponentDeserializer, ComponentKind, ComponentRegistry, MeshRenderer, PageSpawner};
    pub use crate::config::{CameraConfig, FootstepConfig, GameConfig, PageConfig};
    pub use crate::directors::{AmbientDirector, FootstepDirector, StaticDirector, Surface, SurfaceRegistry};
    pub use crate::error::{GameError, Result};
    pub use crate::pages::PageSystem;
    pub use crate::player::{PlayerInput, PlayerRig};
    pub use crate::scene::{Entity, EntityDescription, EntityId, Scene, SceneDescription, Transform};
    pub use crate::session::{static_intensity, MeshLibrary, Outcome, PlaySession};
}

pub use prelude::*;
