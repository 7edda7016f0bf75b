//! View frustum for visibility tests
//!
//! Rebuilt every frame from the camera's view-projection matrix; never kept
//! across frames.

use glam::{Mat4, Vec3, Vec4};

/// Oriented plane `normal . p + offset = 0`, normal facing into the frustum
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    /// Normalise a raw `(a, b, c, d)` clip-space row. Degenerate rows become
    /// a plane every point passes.
    fn from_row(row: Vec4) -> Self {
        let normal = row.truncate();
        let length = normal.length();
        if length > 1e-10 {
            Self {
                normal: normal / length,
                offset: row.w / length,
            }
        } else {
            Self {
                normal: Vec3::Y,
                offset: f32::MAX,
            }
        }
    }

    /// Plane through `point` facing along `normal`
    pub fn through(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            offset: -normal.dot(point),
        }
    }

    /// Signed distance, positive on the inner side
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.offset
    }
}

/// Six inward-facing planes: left, right, bottom, top, near, far
#[derive(Clone, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract planes from a view-projection matrix (Gribb/Hartmann, GL clip space)
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (vp.row(0), vp.row(1), vp.row(2), vp.row(3));

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r3 + r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// Frustum of a perspective camera at `eye` looking along `forward`
    pub fn from_camera(eye: Vec3, forward: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let view = Mat4::look_to_rh(eye, forward, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(fov_y, aspect, near, far);
        Self::from_view_projection(&(projection * view))
    }

    /// Whether a sphere touches the frustum; outside means some plane has the
    /// centre further than `radius` behind it
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }

    /// Whether a point lies inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.contains_sphere(point, 0.0)
    }
}
