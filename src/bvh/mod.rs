//! Bounding volume hierarchy over points or boxes.
//!
//! The tree is an implicit complete binary tree stored in a flat array:
//! slot 1 is the root, the children of slot `k` are `2k` and `2k + 1`, and
//! slot 0 is never used. Every slot holds a [`BvhNode`].
//!
//! ## Architecture
//! ```text
//! primitives → Bvh::build (largest-extent median split) → node array
//! ray + StackSlot → Bvh::hit → candidate primitive indices
//! ```

pub mod aabb;
pub mod build;
pub mod stack;
pub mod traverse;

pub use aabb::Aabb;
pub use build::Bvh;
pub use stack::{StackPool, StackSlot};

use crate::util::{Axes, Vec2, Vec3};

/// Index of the root slot.
pub const ROOT: usize = 1;

/// One slot of the implicit tree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BvhNode<V: Axes> {
    /// Nothing stored here (also every child of a leaf).
    #[default]
    Empty,
    /// A single primitive and its bounds.
    Leaf { bounds: Aabb<V>, primitive: usize },
    /// Union of both subtrees, split along `axis`.
    Internal { bounds: Aabb<V>, axis: usize },
}

impl<V: Axes> BvhNode<V> {
    /// Bounds of a leaf or internal node.
    #[inline]
    pub fn bounds(&self) -> Option<&Aabb<V>> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { bounds, .. } | BvhNode::Internal { bounds, .. } => Some(bounds),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BvhNode::Empty)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}

/// Something the builder can place in the tree.
pub trait BvhPrimitive<V: Axes> {
    /// Bounds stored in the primitive's leaf.
    fn bounds(&self) -> Aabb<V>;

    /// Coordinate used to order primitives along the split axis.
    fn sort_key(&self) -> V;
}

macro_rules! impl_point_primitive {
    ($ty:ty) => {
        impl BvhPrimitive<$ty> for $ty {
            #[inline]
            fn bounds(&self) -> Aabb<$ty> {
                Aabb::from_point(*self)
            }

            #[inline]
            fn sort_key(&self) -> $ty {
                *self
            }
        }
    };
}

impl_point_primitive!(Vec2);
impl_point_primitive!(Vec3);

/// Boxes sort by their centers; the node box is the union of member boxes.
impl<V: Axes> BvhPrimitive<V> for Aabb<V> {
    #[inline]
    fn bounds(&self) -> Aabb<V> {
        *self
    }

    #[inline]
    fn sort_key(&self) -> V {
        self.center()
    }
}
