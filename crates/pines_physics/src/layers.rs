//! Collision layers
//!
//! Three layers exist: level geometry, the player capsule and pickup
//! volumes. The capsule only ever resolves against the level, and gameplay
//! rays never see the capsule.

use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Bit index of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Level geometry
    pub const STATIC: Self = Self(0);
    /// The player capsule
    pub const CHARACTER: Self = Self(1);
    /// Pickup volumes (pages)
    pub const INTERACTABLE: Self = Self(2);

    pub fn as_mask(self) -> u32 {
        1 << self.0
    }
}

/// Membership and filter masks of a collider or query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    pub memberships: u32,
    /// Layers this collider or query interacts with
    pub filter: u32,
}

impl CollisionGroups {
    pub fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    /// Level geometry: blocks the character and every query
    pub fn level() -> Self {
        Self::new(CollisionLayer::STATIC.as_mask(), u32::MAX)
    }

    /// The player capsule: resolves against level geometry only
    pub fn character() -> Self {
        Self::new(CollisionLayer::CHARACTER.as_mask(), CollisionLayer::STATIC.as_mask())
    }

    /// Pickup volumes: visible to queries, ignored by the capsule
    pub fn interactable() -> Self {
        Self::new(
            CollisionLayer::INTERACTABLE.as_mask(),
            !CollisionLayer::CHARACTER.as_mask(),
        )
    }

    /// Default filter for gameplay raycasts; skips the player's own capsule
    pub fn world_query() -> Self {
        Self::new(
            u32::MAX,
            CollisionLayer::STATIC.as_mask() | CollisionLayer::INTERACTABLE.as_mask(),
        )
    }

    /// Rays that only stop at level geometry (sightlines, ground probes)
    pub fn level_only() -> Self {
        Self::new(u32::MAX, CollisionLayer::STATIC.as_mask())
    }

    /// Same pairing rule rapier applies to interaction groups
    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        self.memberships & other.filter != 0 && other.memberships & self.filter != 0
    }

    pub(crate) fn to_rapier(self) -> rapier::InteractionGroups {
        rapier::InteractionGroups::new(
            rapier::Group::from_bits_truncate(self.memberships),
            rapier::Group::from_bits_truncate(self.filter),
        )
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::world_query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_bits() {
        assert_eq!(CollisionLayer::STATIC.as_mask(), 0b001);
        assert_eq!(CollisionLayer::CHARACTER.as_mask(), 0b010);
        assert_eq!(CollisionLayer::INTERACTABLE.as_mask(), 0b100);
    }

    #[test]
    fn test_character_hits_level_only() {
        let character = CollisionGroups::character();
        assert!(character.interacts_with(&CollisionGroups::level()));
        assert!(!character.interacts_with(&CollisionGroups::interactable()));
    }

    #[test]
    fn test_queries_skip_character() {
        let query = CollisionGroups::world_query();
        assert!(query.interacts_with(&CollisionGroups::level()));
        assert!(query.interacts_with(&CollisionGroups::interactable()));
        assert!(!query.interacts_with(&CollisionGroups::character()));
    }

    #[test]
    fn test_level_only_ignores_pickups() {
        let probe = CollisionGroups::level_only();
        assert!(probe.interacts_with(&CollisionGroups::level()));
        assert!(!probe.interacts_with(&CollisionGroups::interactable()));
        assert!(!probe.interacts_with(&CollisionGroups::character()));
    }
}
