//! Closed component set and the type-tag registry that builds it
//!
//! Scene files name each component with a `"type"` tag. The registry maps
//! that tag to a plain deserializer function, so nothing downstream needs
//! runtime type inspection: systems match on [`Component`] directly.

use crate::error::{GameError, Result};
use crate::scene::Transform;
use glam::Vec3;
use pines_audio::ChannelPurpose;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Discriminant used for lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Player,
    Antagonist,
    MeshRenderer,
    Page,
    PageSpawner,
    AudioSource,
}

/// Everything an entity can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// The controllable player
    Player,
    /// The antagonist
    Antagonist,
    /// Static level geometry
    MeshRenderer(MeshRenderer),
    /// A collectable page
    Page,
    /// Where pages may appear
    PageSpawner(PageSpawner),
    /// Marks an entity as the owner of a sound channel
    AudioSource { purpose: ChannelPurpose },
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Player => ComponentKind::Player,
            Component::Antagonist => ComponentKind::Antagonist,
            Component::MeshRenderer(_) => ComponentKind::MeshRenderer,
            Component::Page => ComponentKind::Page,
            Component::PageSpawner(_) => ComponentKind::PageSpawner,
            Component::AudioSource { .. } => ComponentKind::AudioSource,
        }
    }
}

/// Geometry reference, optionally drawn once per instance transform
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRenderer {
    /// Key into the mesh library
    pub mesh: String,
    /// Per-instance transforms relative to the entity; empty means one copy
    pub instances: Vec<Transform>,
}

/// Page spawn configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpawner {
    pub total_pages: u32,
    pub spawn_points: Vec<Vec3>,
}

impl Default for PageSpawner {
    fn default() -> Self {
        Self {
            total_pages: 8,
            spawn_points: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct AudioSourceData {
    purpose: ChannelPurpose,
}

/// Builds a component from its JSON description
pub type ComponentDeserializer = fn(&Value) -> Result<Component>;

/// Maps scene-file type tags to deserializers
pub struct ComponentRegistry {
    by_tag: BTreeMap<String, ComponentDeserializer>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { by_tag: BTreeMap::new() }
    }

    /// Registry with every built-in component
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register("Player", |_| Ok(Component::Player))
            .register("Antagonist", |_| Ok(Component::Antagonist))
            .register("Page", |_| Ok(Component::Page))
            .register("MeshRenderer", mesh_renderer)
            .register("PageSpawner", page_spawner)
            .register("AudioSource", audio_source);
        registry
    }

    /// Register (or replace) the deserializer for `tag`
    pub fn register(&mut self, tag: impl Into<String>, deserializer: ComponentDeserializer) -> &mut Self {
        self.by_tag.insert(tag.into(), deserializer);
        self
    }

    /// Check if a tag is registered
    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Build the component registered under `tag`
    pub fn deserialize(&self, tag: &str, data: &Value) -> Result<Component> {
        let deserializer = self
            .by_tag
            .get(tag)
            .ok_or_else(|| GameError::UnknownComponent(tag.to_string()))?;
        deserializer(data)
    }

    /// Build a component whose tag is its own `"type"` field
    pub fn deserialize_tagged(&self, data: &Value) -> Result<Component> {
        let tag = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GameError::UnknownComponent(format!("component without a type tag: {data}")))?;
        self.deserialize(tag, data)
    }

    /// Registered tags in sorted order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("tags", &self.by_tag.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn mesh_renderer(data: &Value) -> Result<Component> {
    Ok(Component::MeshRenderer(MeshRenderer::deserialize(data)?))
}

fn page_spawner(data: &Value) -> Result<Component> {
    Ok(Component::PageSpawner(PageSpawner::deserialize(data)?))
}

fn audio_source(data: &Value) -> Result<Component> {
    let AudioSourceData { purpose } = AudioSourceData::deserialize(data)?;
    Ok(Component::AudioSource { purpose })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_tags() {
        let registry = ComponentRegistry::with_builtin();
        let tags: Vec<_> = registry.tags().collect();
        assert_eq!(
            tags,
            ["Antagonist", "AudioSource", "MeshRenderer", "Page", "PageSpawner", "Player"]
        );
    }

    #[test]
    fn test_mesh_renderer_from_json() {
        let registry = ComponentRegistry::with_builtin();
        let component = registry
            .deserialize_tagged(&json!({ "type": "MeshRenderer", "mesh": "forest" }))
            .unwrap();

        assert_eq!(component.kind(), ComponentKind::MeshRenderer);
        match component {
            Component::MeshRenderer(renderer) => {
                assert_eq!(renderer.mesh, "forest");
                assert!(renderer.instances.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_audio_source_purpose() {
        let registry = ComponentRegistry::with_builtin();
        let component = registry
            .deserialize("AudioSource", &json!({ "purpose": "footsteps" }))
            .unwrap();
        assert_eq!(
            component,
            Component::AudioSource {
                purpose: ChannelPurpose::Footsteps
            }
        );
    }

    #[test]
    fn test_unknown_tag() {
        let registry = ComponentRegistry::with_builtin();
        let result = registry.deserialize_tagged(&json!({ "type": "Flashlight" }));
        assert!(matches!(result, Err(GameError::UnknownComponent(tag)) if tag == "Flashlight"));
    }

    #[test]
    fn test_custom_registration_replaces() {
        let mut registry = ComponentRegistry::new();
        registry.register("Page", |_| Ok(Component::Antagonist));
        assert!(registry.contains("Page"));
        assert_eq!(
            registry.deserialize("Page", &Value::Null).unwrap(),
            Component::Antagonist
        );
    }
}
