//! Teleport destination search
//!
//! Two policies. [`pick_spawn_point`] sorts a fixed list by distance and
//! biases toward the closer end of the valid candidates as aggression rises.
//! [`search_region`] probes random angles around the player at an
//! aggression-dependent distance and keeps the first candidate that stands
//! on open ground out of the player's sight. Both return `None` when nothing
//! qualifies; the caller simply skips the teleport.

use crate::config::{AntagonistConfig, SpawnRegion};
use crate::perception::Sightline;
use glam::Vec3;
use pines_physics::{CollisionGroups, PhysicsWorld, RaycastOptions};
use rand::Rng;
use std::f32::consts::TAU;

/// Side probes that must hit before a spot counts as enclosed
const ENCLOSED_SIDES: usize = 3;

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    if spread > 0.0 {
        rng.random_range(-spread..spread)
    } else {
        0.0
    }
}

/// Spawn points a teleport may use, closest first.
///
/// A point qualifies when it is beyond detection distance, or beyond close
/// distance and not visible to the player.
pub fn valid_spawn_points(
    config: &AntagonistConfig,
    points: &[Vec3],
    player_position: Vec3,
    sightline: &Sightline<'_>,
) -> Vec<(Vec3, f32)> {
    let mut candidates: Vec<(Vec3, f32)> = points
        .iter()
        .map(|p| (*p, p.distance(player_position)))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    candidates
        .into_iter()
        .filter(|(point, distance)| {
            *distance > config.detection_distance
                || (*distance > config.close_distance && !sightline.can_see(*point))
        })
        .collect()
}

/// Sorted-candidate policy
pub fn pick_spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    config: &AntagonistConfig,
    points: &[Vec3],
    player_position: Vec3,
    aggression_ratio: f32,
    sightline: &Sightline<'_>,
) -> Option<Vec3> {
    let valid = valid_spawn_points(config, points, player_position, sightline);
    if valid.is_empty() {
        return None;
    }

    // Full aggression leans to index 0 (closest), none to the farthest
    let last = (valid.len() - 1) as f32;
    let bias = 1.0 - aggression_ratio + jitter(rng, config.placement_jitter);
    let index = ((bias * last) as isize).clamp(0, valid.len() as isize - 1) as usize;

    Some(valid[index].0)
}

/// Procedural-candidate policy
pub fn search_region<R: Rng + ?Sized>(
    rng: &mut R,
    config: &AntagonistConfig,
    region: &SpawnRegion,
    player_position: Vec3,
    aggression_ratio: f32,
    sightline: &Sightline<'_>,
) -> Option<Vec3> {
    let physics = sightline.physics();

    for attempt in 0..region.max_attempts {
        let bias = (1.0 - aggression_ratio + jitter(rng, config.placement_jitter)).clamp(0.0, 1.0);
        let target_distance = region.near_distance + (region.far_distance - region.near_distance) * bias;
        let angle = rng.random_range(0.0..TAU);

        let x = (player_position.x + angle.cos() * target_distance).clamp(region.min.x, region.max.x);
        let z = (player_position.z + angle.sin() * target_distance).clamp(region.min.z, region.max.z);

        let Some(ground) = ground_at(physics, region, x, z) else {
            continue;
        };
        let candidate = ground + Vec3::Y * region.spawn_height;

        if is_enclosed(physics, candidate, region.enclosure_probe) {
            continue;
        }
        if sightline.can_see(candidate) {
            continue;
        }

        log::debug!(
            "Spawn search accepted ({:.1}, {:.1}, {:.1}) after {} attempts",
            candidate.x,
            candidate.y,
            candidate.z,
            attempt + 1
        );
        return Some(candidate);
    }

    log::debug!("Spawn search found nothing in {} attempts", region.max_attempts);
    None
}

fn level_only(max_distance: f32) -> RaycastOptions {
    RaycastOptions::default()
        .with_max_distance(max_distance)
        .with_filter(CollisionGroups::level_only())
}

/// Walkable ground under (x, z), probing down from above the region
fn ground_at(physics: &PhysicsWorld, region: &SpawnRegion, x: f32, z: f32) -> Option<Vec3> {
    let top = region.max.y + region.ground_probe_height;
    let depth = top - region.min.y + region.ground_probe_height;
    let hit = physics.raycast_with(Vec3::new(x, top, z), Vec3::NEG_Y, &level_only(depth))?;

    (hit.normal.y >= region.min_ground_normal_y).then_some(hit.point)
}

/// Whether geometry surrounds `point` on at least three cardinal sides
fn is_enclosed(physics: &PhysicsWorld, point: Vec3, probe: f32) -> bool {
    if probe <= 0.0 {
        return false;
    }
    let options = level_only(probe);
    [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z]
        .iter()
        .filter(|dir| physics.raycast_with(point, **dir, &options).is_some())
        .count()
        >= ENCLOSED_SIDES
}
