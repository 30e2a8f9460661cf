//! Axis-aligned bounding box and the ray/box slab test.

use std::fmt;

use crate::util::Axes;

/// Axis-aligned bounding box in two or three dimensions.
#[derive(Clone, Copy, PartialEq)]
pub struct Aabb<V: Axes> {
    pub min: V,
    pub max: V,
}

impl<V: Axes> Aabb<V> {
    /// Empty bounding box (inverted, will expand on first point).
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: V::splat(f32::INFINITY),
            max: V::splat(f32::NEG_INFINITY),
        }
    }

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: V, max: V) -> Self {
        Self { min, max }
    }

    /// Create a zero-extent bounding box around a single point.
    #[inline]
    pub fn from_point(p: V) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing all `points`; empty for an empty slice.
    pub fn from_points(points: &[V]) -> Self {
        let mut b = Self::empty();
        for &p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (inverted on some axis).
    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..V::DIM).any(|i| self.min.axis(i) > self.max.axis(i))
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: V) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Union of two boxes.
    #[inline]
    pub fn union(a: &Self, b: &Self) -> Self {
        let mut u = *a;
        u.expand_by_box(b);
        u
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> V {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> V {
        self.max - self.min
    }

    /// Axis of largest extent; ties go to the lowest axis.
    pub fn largest_axis(&self) -> usize {
        let size = self.size();
        let mut best = 0;
        for i in 1..V::DIM {
            if size.axis(i) > size.axis(best) {
                best = i;
            }
        }
        best
    }

    /// True if `other` lies entirely inside this box (boundaries included).
    pub fn contains_box(&self, other: &Self) -> bool {
        (0..V::DIM).all(|i| {
            self.min.axis(i) <= other.min.axis(i) && other.max.axis(i) <= self.max.axis(i)
        })
    }

    /// Slab test: does the ray `ro + t * rd` cross this box?
    ///
    /// Axes where `|rd| < eps` are treated as parallel; an origin outside
    /// the slab on such an axis is an immediate miss. The interval starts
    /// as `[-inf, inf]`, so hits behind the origin count too. Only a
    /// boolean is returned, distances are resolved at the primitive.
    pub fn ray_hit(&self, ro: V, rd: V, eps: f32, inf: f32) -> bool {
        let mut near = -inf;
        let mut far = inf;

        for i in 0..V::DIM {
            let (o, d) = (ro.axis(i), rd.axis(i));
            let (lo, hi) = (self.min.axis(i), self.max.axis(i));

            if d.abs() < eps {
                if o < lo || o > hi {
                    return false;
                }
            } else {
                let t1 = (lo - o) / d;
                let t2 = (hi - o) / d;
                near = near.max(t1.min(t2));
                far = far.min(t1.max(t2));
            }
        }

        near <= far
    }
}

impl<V: Axes> Default for Aabb<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: Axes> fmt::Debug for Aabb<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aabb({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Vec2, Vec3, EPS, INF};

    fn unit_box() -> Aabb<Vec3> {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_expand() {
        let mut b = Aabb::<Vec3>::empty();
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ZERO);

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
        assert_eq!(b.size(), Vec3::ONE);
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        assert_eq!(Aabb::union(&a, &Aabb::empty()), a);
        assert_eq!(Aabb::union(&Aabb::empty(), &a), a);
    }

    #[test]
    fn test_largest_axis_ties() {
        let b = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(b.largest_axis(), 0);
        let b = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(b.largest_axis(), 1);
        let b = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(b.largest_axis(), 2);
    }

    #[test]
    fn test_parallel_ray_outside_slab_misses() {
        let b = unit_box();
        // Parallel to x, but y is outside [-1, 1]
        assert!(!b.ray_hit(Vec3::new(-5.0, 2.0, 0.0), Vec3::X, EPS, INF));
        // Parallel to z, x outside
        assert!(!b.ray_hit(Vec3::new(1.5, 0.0, -5.0), Vec3::Z, EPS, INF));
    }

    #[test]
    fn test_origin_inside_hits_every_direction() {
        let b = unit_box();
        let dirs = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        for d in dirs {
            assert!(b.ray_hit(b.center(), d, EPS, INF), "direction {d:?}");
        }
    }

    #[test]
    fn test_oblique_hit_and_miss() {
        let b = unit_box();
        let d = Vec3::new(1.0, 0.2, 0.0).normalize();
        assert!(b.ray_hit(Vec3::new(-5.0, 0.0, 0.0), d, EPS, INF));
        let d = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!(!b.ray_hit(Vec3::new(-5.0, 0.0, 0.0), d, EPS, INF));
    }

    #[test]
    fn test_degenerate_box_hit() {
        let b = Aabb::from_point(Vec2::new(0.5, 0.5));
        assert!(b.ray_hit(Vec2::new(-1.0, 0.5), Vec2::X, EPS, INF));
        assert!(!b.ray_hit(Vec2::new(-1.0, 0.6), Vec2::X, EPS, INF));
    }
}
