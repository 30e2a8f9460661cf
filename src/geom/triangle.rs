//! Triangle math: ray intersection, normals, barycentric interpolation.

use std::ops::{Add, Mul};

use crate::util::{Vec2, Vec3};

/// Result of a successful ray/triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter `t` of the hit point `ro + t * rd`.
    pub distance: f32,
    /// Barycentric `(u, v)`; the weight of `v0` is `1 - u - v`.
    pub uv: Vec2,
}

/// Shading attributes at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub normal: Vec3,
    pub texcoord: Vec2,
}

/// Determinant-based ray/triangle test.
///
/// Both windings hit. A ray within `eps` of the triangle plane's
/// orientation misses, and so does any hit with `t <= eps`.
pub fn ray_triangle_hit(
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    ro: Vec3,
    rd: Vec3,
    eps: f32,
) -> Option<TriangleHit> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;

    let p = rd.cross(e2);
    let det = e1.dot(p);
    if det.abs() < eps {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ro - v0;
    let u = s.dot(p) * inv_det;
    if u < 0.0 {
        return None;
    }

    let q = s.cross(e1);
    let v = rd.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(q) * inv_det;
    if t <= eps {
        return None;
    }

    Some(TriangleHit {
        distance: t,
        uv: Vec2::new(u, v),
    })
}

/// Half the cross product of the edges: points along the winding normal,
/// length equals the triangle area.
#[inline]
pub fn area_vector(v: &[Vec3; 3]) -> Vec3 {
    (v[1] - v[0]).cross(v[2] - v[0]) * 0.5
}

/// Unit normal following the stored winding; zero for degenerate faces.
#[inline]
pub fn face_normal(v: &[Vec3; 3]) -> Vec3 {
    (v[1] - v[0]).cross(v[2] - v[0]).normalize_or_zero()
}

/// Weighted sum of three per-vertex values.
#[inline]
pub fn interpolate<T>(values: &[T; 3], weights: Vec3) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    values[0] * weights.x + values[1] * weights.y + values[2] * weights.z
}

/// Uniform point on a triangle from two uniforms in `[0, 1)`.
///
/// Weights are `(1 - r1, r1 (1 - r2), r1 r2)`; returns the point and the
/// weights used.
#[inline]
pub fn sample_point(v: &[Vec3; 3], r1: f32, r2: f32) -> (Vec3, Vec3) {
    let weights = Vec3::new(1.0 - r1, r1 * (1.0 - r2), r1 * r2);
    (interpolate(v, weights), weights)
}
