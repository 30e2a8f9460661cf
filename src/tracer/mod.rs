//! The triangle tracer: store, BVH, traversal stacks and light index under
//! one owner.
//!
//! ## Phases
//! ```text
//! add_object / set_face_* → update() → hit / hit_batch / calc_geometry
//!                         → update_emissive_index() → sample_light_position
//! ```
//!
//! Mutating calls take `&mut self`, tracing through an external stack slot
//! takes `&self`, so a rebuild can never overlap a trace.

mod config;
mod hit;

pub use config::TracerConfig;
pub use hit::{Hit, Ray};

use rand::Rng;
use rayon::prelude::*;

use crate::bvh::{Bvh, StackPool, StackSlot};
use crate::geom::{Mesh, SurfaceGeometry, TriangleStore};
use crate::light::{self, EmissiveIndex, LightSample, MaterialTable};
use crate::util::{Result, Vec3};

/// BVH-accelerated ray tracer over a bounded triangle soup.
#[derive(Debug)]
pub struct TriangleTracer {
    config: TracerConfig,
    store: TriangleStore,
    bvh: Bvh<Vec3>,
    stacks: StackPool,
    lights: EmissiveIndex,
}

impl TriangleTracer {
    /// Validate `config` and allocate every buffer up front.
    pub fn new(config: TracerConfig) -> Result<Self> {
        config.validate()?;

        let store = TriangleStore::new(
            config.max_faces,
            config.smoothing,
            config.texturing,
            config.multi_material,
        );
        let bvh = Bvh::new(config.tree_capacity());
        let stacks = StackPool::new(config.stack_slots, config.stack_depth());
        let lights = EmissiveIndex::new(config.max_faces);

        tracing::debug!(
            max_faces = config.max_faces,
            tree_capacity = bvh.capacity(),
            stack_slots = stacks.slots(),
            stack_depth = stacks.depth(),
            "tracer allocated"
        );

        Ok(Self {
            config,
            store,
            bvh,
            stacks,
            lights,
        })
    }

    #[inline]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &TriangleStore {
        &self.store
    }

    #[inline]
    pub fn bvh(&self) -> &Bvh<Vec3> {
        &self.bvh
    }

    #[inline]
    pub fn lights(&self) -> &EmissiveIndex {
        &self.lights
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.store.face_count()
    }

    #[inline]
    pub fn material_id(&self, face: usize) -> u32 {
        self.store.material_id(face)
    }

    // --- Scene setup ---

    /// Append a mesh; returns the number of faces that fit.
    pub fn add_object<M: Mesh + ?Sized>(&mut self, mesh: &M, material_id: u32) -> usize {
        self.store.add_object(mesh, material_id)
    }

    /// Drop all faces and the emissive index. The BVH keeps describing the
    /// old scene until the next [`update`](Self::update).
    pub fn clear_objects(&mut self) {
        self.store.clear();
        self.lights.clear();
    }

    /// Replace all faces. The emissive index is emptied; call
    /// [`update_emissive_index`](Self::update_emissive_index) again.
    pub fn set_face_vertices(&mut self, faces: &[[[f32; 3]; 3]]) -> usize {
        self.lights.clear();
        self.store.set_face_vertices(faces)
    }

    pub fn set_face_normals(&mut self, faces: &[[[f32; 3]; 3]]) -> Result<usize> {
        self.store.set_face_normals(faces)
    }

    pub fn set_face_coordinates(&mut self, faces: &[[[f32; 2]; 3]]) -> Result<usize> {
        self.store.set_face_coordinates(faces)
    }

    pub fn set_face_vertices_flat(&mut self, data: &[f32]) -> Result<usize> {
        let count = self.store.set_face_vertices_flat(data)?;
        self.lights.clear();
        Ok(count)
    }

    pub fn set_face_normals_flat(&mut self, data: &[f32]) -> Result<usize> {
        self.store.set_face_normals_flat(data)
    }

    pub fn set_face_coordinates_flat(&mut self, data: &[f32]) -> Result<usize> {
        self.store.set_face_coordinates_flat(data)
    }

    pub fn export_vertices(&self) -> Vec<[[f32; 3]; 3]> {
        self.store.export_vertices()
    }

    /// Rebuild the BVH over the current faces.
    #[tracing::instrument(skip_all, fields(faces = self.store.face_count()))]
    pub fn update(&mut self) -> Result<()> {
        let bounds = self.store.face_bounds();
        self.bvh.build(&bounds)
    }

    // --- Tracing ---

    /// Closest hit along a ray, using the tracer's first stack slot.
    pub fn hit(&mut self, origin: Vec3, direction: Vec3) -> Option<Hit> {
        let mut slot = self.stacks.slot(0);
        closest_hit(&self.bvh, &self.store, &self.config, &mut slot, origin, direction)
    }

    /// Closest hit along a ray, using a caller-owned stack slot.
    ///
    /// The slot must be at least [`TracerConfig::stack_depth`] deep; pools
    /// from [`new_stack_pool`](Self::new_stack_pool) are.
    pub fn hit_with_slot(&self, slot: &mut StackSlot<'_>, origin: Vec3, direction: Vec3) -> Option<Hit> {
        closest_hit(&self.bvh, &self.store, &self.config, slot, origin, direction)
    }

    /// Trace many rays in parallel, one stack slot per chunk of rays.
    ///
    /// Results are in ray order.
    pub fn hit_batch(&mut self, rays: &[Ray]) -> Vec<Option<Hit>> {
        if rays.is_empty() {
            return Vec::new();
        }

        let chunk = rays.len().div_ceil(self.stacks.slots());
        let (bvh, store, config) = (&self.bvh, &self.store, &self.config);

        let chunks: Vec<Vec<Option<Hit>>> = rays
            .par_chunks(chunk)
            .zip(self.stacks.par_slots_mut())
            .map(|(rays, mut slot)| {
                rays.iter()
                    .map(|r| closest_hit(bvh, store, config, &mut slot, r.origin, r.direction))
                    .collect()
            })
            .collect();

        chunks.into_iter().flatten().collect()
    }

    /// Stack pool suitable for [`hit_with_slot`](Self::hit_with_slot).
    pub fn new_stack_pool(&self, slots: usize) -> StackPool {
        StackPool::new(slots, self.stacks.depth())
    }

    /// Shading normal and texture coordinate at a hit.
    pub fn calc_geometry(&self, hit: &Hit) -> SurfaceGeometry {
        self.store.calc_geometry(hit.face, hit.uv)
    }

    // --- Lights ---

    /// Rescan faces for emissive materials. Returns the emitter count.
    pub fn update_emissive_index<T: MaterialTable + ?Sized>(&mut self, materials: &T) -> usize {
        self.lights.rebuild(&self.store, materials)
    }

    /// Sample a point on an emissive face as seen from `reference`.
    pub fn sample_light_position<R: Rng + ?Sized>(&self, reference: Vec3, rng: &mut R) -> Result<LightSample> {
        light::sample_light_position(&self.store, &self.lights, reference, self.config.eps, rng)
    }
}

/// Reduce every candidate leaf to the nearest triangle hit.
fn closest_hit(
    bvh: &Bvh<Vec3>,
    store: &TriangleStore,
    config: &TracerConfig,
    slot: &mut StackSlot<'_>,
    ro: Vec3,
    rd: Vec3,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    bvh.hit(slot, ro, rd, config.eps, config.inf, |face| {
        if face >= store.face_count() {
            return;
        }
        if let Some(h) = store.element_hit(face, ro, rd, config.eps) {
            if best.map_or(true, |b| h.distance < b.distance) {
                best = Some(Hit {
                    face,
                    distance: h.distance,
                    uv: h.uv,
                });
            }
        }
    });
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IndexedMesh;
    use crate::light::BasicMaterial;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracer(max_faces: usize) -> TriangleTracer {
        TriangleTracer::new(TracerConfig {
            stack_slots: 4,
            ..TracerConfig::with_max_faces(max_faces)
        })
        .unwrap()
    }

    /// Unit quads stacked along z at 1, 2, 3.
    fn stacked_quads(t: &mut TriangleTracer) {
        for z in [3.0, 1.0, 2.0] {
            let quad = IndexedMesh::quad(Vec3::new(0.0, 0.0, z), Vec3::X, Vec3::Y);
            t.add_object(&quad, z as u32);
        }
        t.update().unwrap();
    }

    #[test]
    fn test_invalid_config() {
        let config = TracerConfig {
            stack_depth: Some(1),
            ..TracerConfig::with_max_faces(64)
        };
        assert!(TriangleTracer::new(config).is_err());
    }

    #[test]
    fn test_closest_of_overlapping_faces() {
        let mut t = tracer(16);
        stacked_quads(&mut t);

        let hit = t.hit(Vec3::new(0.3, 0.6, -1.0), Vec3::Z).unwrap();
        assert_relative_eq!(hit.distance, 2.0);
        assert_eq!(t.material_id(hit.face), 1);

        let hit = t.hit(Vec3::new(0.3, 0.6, 10.0), -Vec3::Z).unwrap();
        assert_relative_eq!(hit.distance, 7.0);
        assert_eq!(t.material_id(hit.face), 3);

        // Between the layers, facing up
        let hit = t.hit(Vec3::new(0.3, 0.6, 1.5), Vec3::Z).unwrap();
        assert_relative_eq!(hit.distance, 0.5);
        assert_eq!(t.material_id(hit.face), 2);
    }

    #[test]
    fn test_miss() {
        let mut t = tracer(16);
        stacked_quads(&mut t);
        assert!(t.hit(Vec3::new(2.0, 2.0, -1.0), Vec3::Z).is_none());
        assert!(t.hit(Vec3::new(0.5, 0.5, -1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_nothing_before_update() {
        let mut t = tracer(16);
        t.add_object(&IndexedMesh::quad(Vec3::ZERO, Vec3::X, Vec3::Y), 0);
        assert!(t.hit(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z).is_none());
        t.update().unwrap();
        assert!(t.hit(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z).is_some());
    }

    #[test]
    fn test_batch_matches_single() {
        let mut t = tracer(64);
        stacked_quads(&mut t);

        let rays: Vec<Ray> = (0..37)
            .map(|i| {
                let x = (i % 7) as f32 * 0.2 - 0.1;
                let y = (i / 7) as f32 * 0.2 - 0.1;
                Ray::new(Vec3::new(x, y, -1.0), Vec3::new(0.01, 0.0, 1.0))
            })
            .collect();

        let batch = t.hit_batch(&rays);
        assert_eq!(batch.len(), rays.len());
        for (ray, b) in rays.iter().zip(&batch) {
            assert_eq!(*b, t.hit(ray.origin, ray.direction));
        }
        assert!(batch.iter().any(Option::is_some));
        assert!(batch.iter().any(Option::is_none));
        assert!(t.hit_batch(&[]).is_empty());
    }

    #[test]
    fn test_hit_with_external_slot() {
        let mut t = tracer(16);
        stacked_quads(&mut t);

        let mut pool = t.new_stack_pool(2);
        let hit = t.hit_with_slot(&mut pool.slot(1), Vec3::new(0.5, 0.2, 0.0), Vec3::Z).unwrap();
        assert_relative_eq!(hit.distance, 1.0);
    }

    #[test]
    fn test_calc_geometry_from_hit() {
        let mut t = TriangleTracer::new(TracerConfig {
            smoothing: true,
            texturing: true,
            ..TracerConfig::with_max_faces(4)
        })
        .unwrap();
        t.add_object(&IndexedMesh::quad(Vec3::ZERO, Vec3::X, Vec3::Y), 0);
        t.update().unwrap();

        let hit = t.hit(Vec3::new(0.75, 0.25, 1.0), -Vec3::Z).unwrap();
        let geo = t.calc_geometry(&hit);
        assert_relative_eq!(geo.normal.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(geo.texcoord.x, 0.75, epsilon = 1e-5);
        assert_relative_eq!(geo.texcoord.y, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_clear_and_refill() {
        let mut t = tracer(16);
        stacked_quads(&mut t);
        t.clear_objects();
        assert_eq!(t.face_count(), 0);
        t.update().unwrap();
        assert!(t.hit(Vec3::new(0.5, 0.5, -1.0), Vec3::Z).is_none());

        t.set_face_vertices(&[[[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [0.0, 1.0, 5.0]]]);
        t.update().unwrap();
        let hit = t.hit(Vec3::new(0.1, 0.1, 0.0), Vec3::Z).unwrap();
        assert_eq!(hit.face, 0);
        assert_relative_eq!(hit.distance, 5.0);
        assert_eq!(t.export_vertices().len(), 1);
    }

    #[test]
    fn test_light_sampling() {
        let mut t = tracer(16);
        stacked_quads(&mut t);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(t.sample_light_position(Vec3::ZERO, &mut rng).is_err());

        let mut table = vec![BasicMaterial::default(); 4];
        table[2] = BasicMaterial::emissive(Vec3::ONE);
        assert_eq!(t.update_emissive_index(&table), 2);

        let s = t.sample_light_position(Vec3::new(0.5, 0.5, 0.0), &mut rng).unwrap();
        assert_eq!(t.material_id(s.face), 2);
        assert_eq!(s.normal, -Vec3::Z);
        assert!(s.position.z < 2.0);
    }

    #[test]
    fn test_geometry_reset_empties_lights() {
        let mut t = tracer(16);
        stacked_quads(&mut t);
        let mut rng = StdRng::seed_from_u64(4);
        let table = vec![BasicMaterial::emissive(Vec3::ONE); 4];
        assert_eq!(t.update_emissive_index(&table), 6);

        t.clear_objects();
        assert_eq!(t.face_count(), 0);
        assert!(t.lights().is_empty());
        assert!(matches!(
            t.sample_light_position(Vec3::ZERO, &mut rng),
            Err(crate::Error::EmptyLightSet)
        ));

        stacked_quads(&mut t);
        assert_eq!(t.update_emissive_index(&table), 6);
        t.set_face_vertices(&[[[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [0.0, 1.0, 5.0]]]);
        assert!(t.sample_light_position(Vec3::ZERO, &mut rng).is_err());
        assert_eq!(t.update_emissive_index(&table), 1);
    }
}
