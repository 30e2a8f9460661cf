//! Procedural demo scene: a closed box with a ceiling light and two blocks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tritrace::prelude::*;

pub const WALL: u32 = 0;
pub const RED: u32 = 1;
pub const GREEN: u32 = 2;
pub const LIGHT: u32 = 3;
pub const BLOCK: u32 = 4;

pub fn materials() -> Vec<BasicMaterial> {
    vec![
        BasicMaterial::diffuse(Vec3::splat(0.8)),
        BasicMaterial::diffuse(Vec3::new(0.8, 0.1, 0.1)),
        BasicMaterial::diffuse(Vec3::new(0.1, 0.8, 0.1)),
        BasicMaterial::emissive(Vec3::splat(17.0)),
        BasicMaterial::diffuse(Vec3::splat(0.6)),
    ]
}

/// Axis-aligned box as six outward-facing quads.
fn cuboid(min: Vec3, max: Vec3) -> Vec<IndexedMesh> {
    let d = max - min;
    let (x, y, z) = (Vec3::X * d.x, Vec3::Y * d.y, Vec3::Z * d.z);
    [
        (min, x, z),
        (min + y, z, x),
        (min, z, y),
        (min + x, y, z),
        (min, y, x),
        (min + z, x, y),
    ]
    .into_iter()
    .map(|(corner, a, b)| IndexedMesh::quad(corner, a, b))
    .collect()
}

/// Tessellate a quad into `n * n` cells of two triangles each.
fn grid(corner: Vec3, a: Vec3, b: Vec3, n: u32) -> IndexedMesh {
    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for j in 0..=n {
        for i in 0..=n {
            positions.push(corner + a * (i as f32 / n as f32) + b * (j as f32 / n as f32));
        }
    }
    let mut indices = Vec::with_capacity((2 * n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let k = j * (n + 1) + i;
            indices.push([k, k + 1, k + n + 2]);
            indices.push([k, k + n + 2, k + n + 1]);
        }
    }
    IndexedMesh::new(positions, indices)
}

/// Fill `tracer` with the demo scene. Returns the number of faces written.
pub fn populate(tracer: &mut TriangleTracer) -> usize {
    let mut written = 0;

    // Floor, ceiling and back wall finely tessellated for a deeper tree
    written += tracer.add_object(&grid(Vec3::new(-1.0, 0.0, -1.0), Vec3::Z * 2.0, Vec3::X * 2.0, 32), WALL);
    written += tracer.add_object(&grid(Vec3::new(-1.0, 2.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, 32), WALL);
    written += tracer.add_object(&grid(Vec3::new(-1.0, 0.0, -1.0), Vec3::X * 2.0, Vec3::Y * 2.0, 32), WALL);
    written += tracer.add_object(&grid(Vec3::new(-1.0, 0.0, -1.0), Vec3::Y * 2.0, Vec3::Z * 2.0, 16), RED);
    written += tracer.add_object(&grid(Vec3::new(1.0, 0.0, -1.0), Vec3::Z * 2.0, Vec3::Y * 2.0, 16), GREEN);

    let lamp = IndexedMesh::quad(Vec3::new(-0.25, 1.99, -0.25), Vec3::X * 0.5, Vec3::Z * 0.5);
    written += tracer.add_object(&lamp, LIGHT);

    let tall = Mat4::from_translation(Vec3::new(-0.35, 0.0, -0.3)) * Mat4::from_rotation_y(0.3);
    for mut side in cuboid(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.2, 0.3)) {
        side.transform(&tall);
        written += tracer.add_object(&side, BLOCK);
    }
    let short = Mat4::from_translation(Vec3::new(0.4, 0.0, 0.35)) * Mat4::from_rotation_y(-0.3);
    for mut side in cuboid(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 0.6, 0.3)) {
        side.transform(&short);
        written += tracer.add_object(&side, BLOCK);
    }

    written
}

/// Pinhole camera rays through the open front of the box, jittered per pixel.
pub fn camera_rays(count: usize, seed: u64) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);
    let eye = Vec3::new(0.0, 1.0, 3.4);
    (0..count)
        .map(|_| {
            let sx: f32 = rng.gen_range(-1.0..1.0);
            let sy: f32 = rng.gen_range(-1.0..1.0);
            let target = Vec3::new(sx * 1.1, 1.0 + sy * 1.1, 0.0);
            Ray::new(eye, (target - eye).normalize())
        })
        .collect()
}
