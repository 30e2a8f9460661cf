//! Capacity-bounded per-face triangle storage.
//!
//! Positions are always present. Normals, texture coordinates and material
//! ids are optional and fixed at construction; writing an attribute the
//! store does not track is an error rather than a silent no-op.

use rayon::prelude::*;

use super::mesh::Mesh;
use super::safe_cast_faces;
use super::triangle::{self, SurfaceGeometry, TriangleHit};
use crate::bvh::Aabb;
use crate::util::{barycentric_weights, Error, Result, Vec2, Vec3};

/// Per-face triangle arrays sized for `max_faces`.
#[derive(Debug, Clone)]
pub struct TriangleStore {
    max_faces: usize,
    face_count: usize,
    vertices: Vec<[Vec3; 3]>,
    normals: Option<Vec<[Vec3; 3]>>,
    texcoords: Option<Vec<[Vec2; 3]>>,
    material_ids: Option<Vec<u32>>,
}

impl TriangleStore {
    /// Allocate storage for `max_faces` faces with the given optional
    /// attributes.
    pub fn new(max_faces: usize, smoothing: bool, texturing: bool, multi_material: bool) -> Self {
        Self {
            max_faces,
            face_count: 0,
            vertices: vec![[Vec3::ZERO; 3]; max_faces],
            normals: smoothing.then(|| vec![[Vec3::ZERO; 3]; max_faces]),
            texcoords: texturing.then(|| vec![[Vec2::ZERO; 3]; max_faces]),
            material_ids: multi_material.then(|| vec![0; max_faces]),
        }
    }

    #[inline]
    pub fn max_faces(&self) -> usize {
        self.max_faces
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }

    #[inline]
    pub fn tracks_normals(&self) -> bool {
        self.normals.is_some()
    }

    #[inline]
    pub fn tracks_texcoords(&self) -> bool {
        self.texcoords.is_some()
    }

    #[inline]
    pub fn tracks_materials(&self) -> bool {
        self.material_ids.is_some()
    }

    /// Forget all faces. Storage stays allocated.
    pub fn clear(&mut self) {
        self.face_count = 0;
    }

    /// Append every face of `mesh`, tagged with `material_id`.
    ///
    /// Faces past `max_faces` are dropped. Returns how many were written.
    /// A mesh without normals gets its flat face normal on every vertex,
    /// one without texture coordinates gets zeros.
    pub fn add_object<M: Mesh + ?Sized>(&mut self, mesh: &M, material_id: u32) -> usize {
        let start = self.face_count;
        let requested = mesh.face_count();
        let count = requested.min(self.max_faces - start);
        if count < requested {
            tracing::debug!(
                requested,
                written = count,
                max_faces = self.max_faces,
                "mesh clamped at store capacity"
            );
        }
        let range = start..start + count;

        self.vertices[range.clone()]
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, dst)| *dst = mesh.face_vertices(i));

        if let Some(normals) = &mut self.normals {
            normals[range.clone()].par_iter_mut().enumerate().for_each(|(i, dst)| {
                *dst = mesh
                    .face_normals(i)
                    .unwrap_or_else(|| [triangle::face_normal(&mesh.face_vertices(i)); 3]);
            });
        }

        if let Some(texcoords) = &mut self.texcoords {
            texcoords[range.clone()].par_iter_mut().enumerate().for_each(|(i, dst)| {
                *dst = mesh.face_texcoords(i).unwrap_or([Vec2::ZERO; 3]);
            });
        }

        if let Some(ids) = &mut self.material_ids {
            ids[range].fill(material_id);
        }

        self.face_count += count;
        count
    }

    /// Replace all faces. `face_count` becomes `min(faces.len(), max_faces)`.
    pub fn set_face_vertices(&mut self, faces: &[[[f32; 3]; 3]]) -> usize {
        let count = faces.len().min(self.max_faces);
        if count < faces.len() {
            tracing::debug!(
                requested = faces.len(),
                written = count,
                "face vertices clamped at store capacity"
            );
        }
        for (dst, src) in self.vertices.iter_mut().zip(&faces[..count]) {
            *dst = src.map(Vec3::from_array);
        }
        self.face_count = count;
        count
    }

    /// Overwrite normals of the current faces. Extra input is ignored.
    pub fn set_face_normals(&mut self, faces: &[[[f32; 3]; 3]]) -> Result<usize> {
        let count = self.face_count.min(faces.len());
        let normals = self
            .normals
            .as_mut()
            .ok_or(Error::AttributeNotTracked("normals"))?;
        for (dst, src) in normals.iter_mut().zip(&faces[..count]) {
            *dst = src.map(Vec3::from_array);
        }
        Ok(count)
    }

    /// Overwrite texture coordinates of the current faces.
    pub fn set_face_coordinates(&mut self, faces: &[[[f32; 2]; 3]]) -> Result<usize> {
        let count = self.face_count.min(faces.len());
        let texcoords = self
            .texcoords
            .as_mut()
            .ok_or(Error::AttributeNotTracked("texcoords"))?;
        for (dst, src) in texcoords.iter_mut().zip(&faces[..count]) {
            *dst = src.map(Vec2::from_array);
        }
        Ok(count)
    }

    /// [`set_face_vertices`](Self::set_face_vertices) from 9 floats per face.
    pub fn set_face_vertices_flat(&mut self, data: &[f32]) -> Result<usize> {
        Ok(self.set_face_vertices(safe_cast_faces(data)?))
    }

    /// [`set_face_normals`](Self::set_face_normals) from 9 floats per face.
    pub fn set_face_normals_flat(&mut self, data: &[f32]) -> Result<usize> {
        self.set_face_normals(safe_cast_faces(data)?)
    }

    /// [`set_face_coordinates`](Self::set_face_coordinates) from 6 floats per face.
    pub fn set_face_coordinates_flat(&mut self, data: &[f32]) -> Result<usize> {
        self.set_face_coordinates(safe_cast_faces(data)?)
    }

    /// Copy out the positions of the current faces.
    pub fn export_vertices(&self) -> Vec<[[f32; 3]; 3]> {
        self.vertices[..self.face_count]
            .iter()
            .map(|f| f.map(|v| v.to_array()))
            .collect()
    }

    /// Positions of the current faces.
    #[inline]
    pub fn vertices(&self) -> &[[Vec3; 3]] {
        &self.vertices[..self.face_count]
    }

    #[inline]
    pub fn face_vertices(&self, face: usize) -> &[Vec3; 3] {
        &self.vertices[face]
    }

    /// Material of `face`; always 0 without per-face materials.
    #[inline]
    pub fn material_id(&self, face: usize) -> u32 {
        self.material_ids.as_ref().map_or(0, |ids| ids[face])
    }

    /// Per-vertex min/max box of every current face.
    pub fn face_bounds(&self) -> Vec<Aabb<Vec3>> {
        self.vertices()
            .par_iter()
            .map(|v| Aabb::from_points(v))
            .collect()
    }

    /// Exact ray test against one face.
    #[inline]
    pub fn element_hit(&self, face: usize, ro: Vec3, rd: Vec3, eps: f32) -> Option<TriangleHit> {
        let [v0, v1, v2] = self.vertices[face];
        triangle::ray_triangle_hit(v0, v1, v2, ro, rd, eps)
    }

    /// Shading normal and texture coordinate at barycentric `uv` on `face`.
    pub fn calc_geometry(&self, face: usize, uv: Vec2) -> SurfaceGeometry {
        let weights = barycentric_weights(uv);

        let texcoord = self
            .texcoords
            .as_ref()
            .map_or(Vec2::ZERO, |t| triangle::interpolate(&t[face], weights));

        let normal = match &self.normals {
            Some(n) => triangle::interpolate(&n[face], weights).normalize_or_zero(),
            None => triangle::face_normal(&self.vertices[face]),
        };

        SurfaceGeometry { normal, texcoord }
    }
}
