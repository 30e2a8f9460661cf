//! Next-event estimation: pick a point on an emissive face.

use rand::Rng;

use super::EmissiveIndex;
use crate::geom::{triangle, TriangleStore};
use crate::util::{Error, Result, Vec3};

/// A point on a light, oriented towards the reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Sampled point, pushed `8 * eps` off the surface along `normal`.
    pub position: Vec3,
    /// Emissive face the point lies on.
    pub face: usize,
    /// Unit face normal, flipped to the reference side.
    pub normal: Vec3,
    /// `|cos| * light count`: the cosine at the light times the inverse
    /// face-selection probability.
    pub weight: f32,
    /// Area of the sampled face.
    pub area: f32,
}

/// Sample a light position as seen from `reference`.
///
/// The face is chosen uniformly among emissive faces regardless of area,
/// then a point uniformly on it.
pub fn sample_light_position<R: Rng + ?Sized>(
    store: &TriangleStore,
    lights: &EmissiveIndex,
    reference: Vec3,
    eps: f32,
    rng: &mut R,
) -> Result<LightSample> {
    let count = lights.len();
    if count == 0 {
        return Err(Error::EmptyLightSet);
    }

    let face = lights.face(rng.gen_range(0..count));
    let verts = store.face_vertices(face);
    let (r1, r2): (f32, f32) = (rng.gen(), rng.gen());
    let (point, _) = triangle::sample_point(verts, r1, r2);

    let area_vec = triangle::area_vector(verts);
    let area = area_vec.length();
    if area <= 0.0 {
        return Ok(LightSample {
            position: point,
            face,
            normal: Vec3::ZERO,
            weight: 0.0,
            area: 0.0,
        });
    }

    let mut normal = area_vec / area;
    let mut cos = normal.dot((reference - point).normalize_or_zero());
    if cos <= 0.0 {
        normal = -normal;
        cos = -cos;
    }

    Ok(LightSample {
        position: point + normal * (eps * 8.0),
        face,
        normal,
        weight: cos * count as f32,
        area,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IndexedMesh;
    use crate::light::BasicMaterial;
    use crate::util::EPS;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lit_store(meshes: &[IndexedMesh]) -> (TriangleStore, EmissiveIndex) {
        let mut store = TriangleStore::new(16, false, false, true);
        for mesh in meshes {
            store.add_object(mesh, 1);
        }
        let table = vec![BasicMaterial::default(), BasicMaterial::emissive(Vec3::ONE)];
        let mut lights = EmissiveIndex::new(store.max_faces());
        lights.rebuild(&store, &table);
        (store, lights)
    }

    fn triangle(a: Vec3, b: Vec3, c: Vec3) -> IndexedMesh {
        IndexedMesh::new(vec![a, b, c], vec![[0, 1, 2]])
    }

    #[test]
    fn test_no_lights() {
        let store = TriangleStore::new(4, false, false, true);
        let lights = EmissiveIndex::new(4);
        let mut rng = StdRng::seed_from_u64(0);
        let err = sample_light_position(&store, &lights, Vec3::ZERO, EPS, &mut rng).unwrap_err();
        assert!(matches!(err, Error::EmptyLightSet));
    }

    #[test]
    fn test_far_reference_weight_mean() {
        let (store, lights) = lit_store(&[triangle(Vec3::ZERO, Vec3::X, Vec3::Y)]);
        let reference = Vec3::new(0.25, 0.25, 1.0e4);
        let mut rng = StdRng::seed_from_u64(42);

        let n = 10_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let s = sample_light_position(&store, &lights, reference, EPS, &mut rng).unwrap();
            assert_eq!(s.face, 0);
            assert_eq!(s.normal, Vec3::Z);
            assert!(s.position.z > 0.0);
            sum += s.weight as f64;
        }
        assert_relative_eq!(sum / n as f64, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_back_facing_light_flips() {
        let (store, lights) = lit_store(&[triangle(Vec3::ZERO, Vec3::X, Vec3::Y)]);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..100 {
            let s = sample_light_position(&store, &lights, Vec3::new(0.2, 0.2, -3.0), EPS, &mut rng).unwrap();
            assert_eq!(s.normal, -Vec3::Z);
            assert!(s.position.z < 0.0);
            assert_relative_eq!(s.position.z, -8.0 * EPS);
            assert!(s.weight > 0.0);
            assert_relative_eq!(s.area, 0.5);
        }
    }

    #[test]
    fn test_selection_ignores_area() {
        let small = triangle(Vec3::ZERO, Vec3::X * 0.1, Vec3::Y * 0.1);
        let large = triangle(Vec3::new(5.0, 0.0, 0.0), Vec3::new(15.0, 0.0, 0.0), Vec3::new(5.0, 10.0, 0.0));
        let (store, lights) = lit_store(&[small, large]);
        let mut rng = StdRng::seed_from_u64(1234);

        let n = 20_000;
        let mut small_hits = 0;
        for _ in 0..n {
            let s = sample_light_position(&store, &lights, Vec3::new(0.0, 0.0, 5.0), EPS, &mut rng).unwrap();
            if s.face == 0 {
                small_hits += 1;
            }
        }
        let freq = small_hits as f64 / n as f64;
        assert!((0.47..0.53).contains(&freq), "small light picked {freq}");
    }

    #[test]
    fn test_degenerate_light_has_zero_weight() {
        let (store, lights) = lit_store(&[triangle(Vec3::ZERO, Vec3::X, Vec3::X * 2.0)]);
        let mut rng = StdRng::seed_from_u64(5);
        let s = sample_light_position(&store, &lights, Vec3::Z, EPS, &mut rng).unwrap();
        assert_eq!(s.weight, 0.0);
        assert!(!s.weight.is_nan());
    }
}
