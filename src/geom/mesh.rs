//! Mesh capability consumed by the triangle store.
//!
//! Anything that can hand out per-face vertex data can be added to a
//! tracer. [`IndexedMesh`] covers the usual positions + index buffer case.

use crate::util::{Mat4, Vec2, Vec3};

/// Per-face access to triangle geometry.
///
/// Must be `Sync`: faces are copied into the store from several threads.
pub trait Mesh: Sync {
    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// Positions of face `i`.
    fn face_vertices(&self, i: usize) -> [Vec3; 3];

    /// Per-vertex normals of face `i`, if the mesh has them.
    fn face_normals(&self, _i: usize) -> Option<[Vec3; 3]> {
        None
    }

    /// Per-vertex texture coordinates of face `i`, if the mesh has them.
    fn face_texcoords(&self, _i: usize) -> Option<[Vec2; 3]> {
        None
    }
}

/// Shared-vertex triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct IndexedMesh {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub texcoords: Option<Vec<Vec2>>,
    pub indices: Vec<[u32; 3]>,
}

impl IndexedMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_texcoords(mut self, texcoords: Vec<Vec2>) -> Self {
        self.texcoords = Some(texcoords);
        self
    }

    /// Axis-aligned quad `corner`, `corner + a`, `corner + a + b`, `corner + b`,
    /// wound so the flat normal is `a × b`.
    pub fn quad(corner: Vec3, a: Vec3, b: Vec3) -> Self {
        let n = a.cross(b).normalize_or_zero();
        Self::new(
            vec![corner, corner + a, corner + a + b, corner + b],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .with_normals(vec![n; 4])
        .with_texcoords(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    /// Apply a model matrix to positions and normals.
    pub fn transform(&mut self, transform: &Mat4) {
        for p in &mut self.positions {
            *p = transform.transform_point3(*p);
        }
        if let Some(normals) = &mut self.normals {
            // normal matrix = transpose(inverse(upper 3x3))
            let normal_mat = transform.inverse().transpose();
            for n in normals.iter_mut() {
                *n = normal_mat.transform_vector3(*n).normalize_or_zero();
            }
        }
    }

    #[inline]
    fn gather<T: Copy>(values: &[T], face: [u32; 3]) -> [T; 3] {
        face.map(|i| values[i as usize])
    }
}

impl Mesh for IndexedMesh {
    fn face_count(&self) -> usize {
        self.indices.len()
    }

    fn face_vertices(&self, i: usize) -> [Vec3; 3] {
        Self::gather(&self.positions, self.indices[i])
    }

    fn face_normals(&self, i: usize) -> Option<[Vec3; 3]> {
        self.normals.as_ref().map(|n| Self::gather(n, self.indices[i]))
    }

    fn face_texcoords(&self, i: usize) -> Option<[Vec2; 3]> {
        self.texcoords.as_ref().map(|t| Self::gather(t, self.indices[i]))
    }
}
