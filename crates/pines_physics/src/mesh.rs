//! Triangle geometry handed over by the asset loader

use glam::{Mat4, Vec3};
use rapier3d::prelude as rapier;

/// Indexed triangle soup used to build static collision bodies
#[derive(Debug, Clone, Default)]
pub struct StaticMesh {
    /// Name of the mesh or submesh (surface classification keys off it)
    pub name: String,
    /// Vertex positions in model space
    pub vertices: Vec<Vec3>,
    /// Triangles as vertex index triples
    pub indices: Vec<[u32; 3]>,
}

impl StaticMesh {
    /// Create a mesh from raw positions and triangle indices
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    /// Horizontal square centred on the origin, facing +Y
    pub fn plane(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        Self::new(
            name,
            vec![
                Vec3::new(-h, 0.0, -h),
                Vec3::new(-h, 0.0, h),
                Vec3::new(h, 0.0, h),
                Vec3::new(h, 0.0, -h),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// Closed box centred on the origin
    pub fn cuboid(name: impl Into<String>, half_extents: Vec3) -> Self {
        let Vec3 { x, y, z } = half_extents;
        let vertices = vec![
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
        ];
        let indices = vec![
            [0, 2, 1], [0, 3, 2], // back
            [4, 5, 6], [4, 6, 7], // front
            [0, 1, 5], [0, 5, 4], // bottom
            [3, 7, 6], [3, 6, 2], // top
            [0, 4, 7], [0, 7, 3], // left
            [1, 2, 6], [1, 6, 5], // right
        ];
        Self::new(name, vertices, indices)
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether the mesh can produce a collision shape at all
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Vertices baked into world space
    pub(crate) fn world_points(&self, transform: &Mat4) -> Vec<rapier::Point<f32>> {
        self.vertices
            .iter()
            .map(|v| {
                let p = transform.transform_point3(*v);
                rapier::Point::new(p.x, p.y, p.z)
            })
            .collect()
    }

    /// Indices whose vertices all exist; malformed triangles are dropped
    pub(crate) fn valid_indices(&self) -> Vec<[u32; 3]> {
        let count = self.vertices.len() as u32;
        self.indices
            .iter()
            .copied()
            .filter(|tri| tri.iter().all(|&i| i < count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_points_apply_transform() {
        let mesh = StaticMesh::plane("ground", 1.0);
        let transform = Mat4::from_translation(Vec3::new(10.0, 2.0, 0.0));
        let points = mesh.world_points(&transform);

        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| (p.y - 2.0).abs() < 1e-6));
        assert!(points.iter().all(|p| p.x >= 9.0 && p.x <= 11.0));
    }

    #[test]
    fn test_out_of_range_indices_dropped() {
        let mut mesh = StaticMesh::plane("ground", 1.0);
        mesh.indices.push([0, 1, 99]);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.valid_indices().len(), 2);
    }

    #[test]
    fn test_cuboid_is_closed() {
        let mesh = StaticMesh::cuboid("crate", Vec3::ONE);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(!mesh.is_empty());
    }
}
