//! Closest-hit raycasts

use crate::layers::CollisionGroups;
use glam::Vec3;
use rapier3d::prelude as rapier;

/// Closest hit of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub collider: rapier::ColliderHandle,
    pub point: Vec3,
    /// Outward surface normal at `point`
    pub normal: Vec3,
    /// Position of the hit along the ray, 0 at the origin and 1 at the end
    pub fraction: f32,
    pub distance: f32,
    /// Tag supplied when the hit body was registered (0 when untagged)
    pub user_data: u128,
}

/// Range and filtering for one raycast
#[derive(Debug, Clone)]
pub struct RaycastOptions {
    /// Ray length; unbounded by default
    pub max_distance: f32,
    /// Rays starting inside a shape hit it at distance 0
    pub solid: bool,
    pub filter: CollisionGroups,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            solid: true,
            filter: CollisionGroups::world_query(),
        }
    }
}

impl RaycastOptions {
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_filter(mut self, filter: CollisionGroups) -> Self {
        self.filter = filter;
        self
    }
}

/// Borrowed view of the collision sets for queries
pub struct PhysicsQuery<'w> {
    pub(crate) pipeline: &'w rapier::QueryPipeline,
    pub(crate) colliders: &'w rapier::ColliderSet,
    pub(crate) bodies: &'w rapier::RigidBodySet,
}

impl PhysicsQuery<'_> {
    /// Cast a ray and get the closest hit.
    ///
    /// `direction` does not need to be normalized; a zero direction or a
    /// non-positive distance never hits.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, options: &RaycastOptions) -> Option<RaycastHit> {
        let length = direction.length();
        if !length.is_finite() || length <= f32::EPSILON || options.max_distance.is_nan() || options.max_distance <= 0.0 {
            return None;
        }
        let unit = direction / length;

        let ray = rapier::Ray::new(
            rapier::Point::new(origin.x, origin.y, origin.z),
            rapier::Vector::new(unit.x, unit.y, unit.z),
        );

        let filter = rapier::QueryFilter::new()
            .groups(options.filter.to_rapier())
            .exclude_sensors();

        let (handle, intersection) = self.pipeline.cast_ray_and_get_normal(
            self.bodies,
            self.colliders,
            &ray,
            options.max_distance,
            options.solid,
            filter,
        )?;

        let distance = intersection.time_of_impact;
        let point = ray.point_at(distance);
        let user_data = self.colliders.get(handle).map(|c| c.user_data).unwrap_or(0);
        let fraction = if options.max_distance.is_finite() && options.max_distance < f32::MAX {
            distance / options.max_distance
        } else {
            0.0
        };

        Some(RaycastHit {
            collider: handle,
            point: Vec3::new(point.x, point.y, point.z),
            normal: Vec3::new(intersection.normal.x, intersection.normal.y, intersection.normal.z),
            fraction,
            distance,
            user_data,
        })
    }
}
