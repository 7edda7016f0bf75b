//! Entity store
//!
//! A [`Scene`] owns every entity of a play session. Systems look entities
//! up by component kind once at session start and afterwards only touch
//! component data and transforms; composition never changes mid-frame
//! except for collected pages, which are despawned.

use crate::component::{Component, ComponentKind, ComponentRegistry};
use crate::error::Result;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;

/// Stable entity identifier. Never zero, so a zero raycast tag always
/// means "untagged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Raycast tag attributing a body to this entity
    pub fn tag(self) -> u128 {
        u128::from(self.get())
    }

    /// Tag for one submesh of this entity. The low 64 bits still carry the
    /// entity so [`from_tag`](Self::from_tag) resolves it.
    pub fn submesh_tag(self, submesh: usize) -> u128 {
        self.tag() | ((submesh as u128 + 1) << 64)
    }

    /// Entity encoded in a raycast tag
    pub fn from_tag(tag: u128) -> Option<Self> {
        Self::new(tag as u64)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position, Euler rotation (radians, applied Y then X then Z) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// One entity and its components
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub components: Vec<Component>,
}

impl Entity {
    /// First component of `kind`
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some()
    }
}

/// Entity store for one session
#[derive(Debug)]
pub struct Scene {
    entities: BTreeMap<EntityId, Entity>,
    next_id: NonZeroU64,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: NonZeroU64::MIN,
        }
    }

    /// Add an entity and return its id
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform, components: Vec<Component>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.into(),
                transform,
                components,
            },
        );
        id
    }

    /// Remove an entity
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Lowest-id entity carrying a component of `kind`
    pub fn find_with(&self, kind: ComponentKind) -> Option<EntityId> {
        self.iter_with(kind).next().map(|e| e.id)
    }

    /// Every entity carrying a component of `kind`, in id order
    pub fn iter_with(&self, kind: ComponentKind) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.has(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form of a scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub entities: Vec<EntityDescription>,
}

/// Serialized form of one entity. Each component is a JSON object whose
/// `"type"` field selects the registry entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescription {
    pub name: String,
    pub transform: Transform,
    pub components: Vec<Value>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Instantiate every entity through `registry`
    pub fn build(&self, registry: &ComponentRegistry) -> Result<Scene> {
        let mut scene = Scene::new();
        for description in &self.entities {
            let components = description
                .components
                .iter()
                .map(|data| registry.deserialize_tagged(data))
                .collect::<Result<Vec<_>>>()?;
            scene.spawn(description.name.clone(), description.transform, components);
        }
        log::info!("Scene built with {} entities", scene.len());
        Ok(scene)
    }
}
