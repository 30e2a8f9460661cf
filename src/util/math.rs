//! Math type re-exports and tracer-specific math utilities.
//!
//! Vectors come from `glam`. The BVH works in either two or three
//! dimensions, so the handful of per-axis operations it needs are
//! collected in the [`Axes`] trait.

pub use glam::{Mat4, Vec2, Vec3};

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Default numeric tolerance for parallel-ray and self-intersection tests.
pub const EPS: f32 = 1e-6;

/// Default bound used as "infinity" by the slab test.
pub const INF: f32 = 1e6;

/// A fixed-dimension float vector usable as a BVH coordinate.
pub trait Axes:
    Copy
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + 'static
{
    /// Number of axes.
    const DIM: usize;

    /// Vector with every component set to `v`.
    fn splat(v: f32) -> Self;

    /// Component along axis `i` (0-based).
    fn axis(self, i: usize) -> f32;

    /// Component-wise minimum.
    fn min(self, other: Self) -> Self;

    /// Component-wise maximum.
    fn max(self, other: Self) -> Self;
}

macro_rules! impl_axes {
    ($ty:ty, $dim:expr) => {
        impl Axes for $ty {
            const DIM: usize = $dim;

            #[inline]
            fn splat(v: f32) -> Self {
                <$ty>::splat(v)
            }

            #[inline]
            fn axis(self, i: usize) -> f32 {
                self[i]
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }
        }
    };
}

impl_axes!(Vec2, 2);
impl_axes!(Vec3, 3);

/// Barycentric weights `(1 - u - v, u, v)` for a hit at `uv`.
#[inline]
pub fn barycentric_weights(uv: Vec2) -> Vec3 {
    Vec3::new(1.0 - uv.x - uv.y, uv.x, uv.y)
}
