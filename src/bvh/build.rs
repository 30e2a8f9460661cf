//! Median-split BVH builder.
//!
//! Each internal node splits its primitives along the axis of largest
//! extent at the median of the sort keys. The upper half goes to the left
//! child `2k`, the lower half to the right child `2k + 1`. Every build
//! starts from an all-empty array; there is no refit.

use super::{Aabb, BvhNode, BvhPrimitive, ROOT};
use crate::util::{Axes, Error, Result};

/// Built tree.
#[derive(Debug, Clone)]
pub struct Bvh<V: Axes> {
    /// Flat slot array, index 0 unused.
    nodes: Vec<BvhNode<V>>,
    /// Depth of the deepest occupied slot (root = 0).
    height: usize,
    leaf_count: usize,
}

/// `ceil(log2(n))`, with `n <= 1` mapping to 0.
#[inline]
fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

impl<V: Axes> Bvh<V> {
    /// Create an empty tree with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: vec![BvhNode::Empty; capacity],
            height: 0,
            leaf_count: 0,
        }
    }

    /// Slots needed to hold a tree over `n` primitives:
    /// `2^(ceil(log2(n)) + 1)`.
    ///
    /// Saturates at `usize::MAX`; see
    /// [`checked_required_capacity`](Self::checked_required_capacity).
    pub fn required_capacity(n: usize) -> usize {
        Self::checked_required_capacity(n).unwrap_or(usize::MAX)
    }

    /// [`required_capacity`](Self::required_capacity), or `None` when it
    /// does not fit in a `usize`.
    pub fn checked_required_capacity(n: usize) -> Option<usize> {
        1usize.checked_shl(ceil_log2(n) as u32 + 1)
    }

    /// Stack depth needed to traverse a tree over `n` primitives.
    ///
    /// Popping a node at depth `d` leaves at most `d` pending siblings on
    /// the stack before its two children go on, and internal nodes sit no
    /// deeper than `ceil(log2(n)) - 1`.
    pub fn required_stack_depth(n: usize) -> usize {
        ceil_log2(n) + 1
    }

    /// Rebuild the tree over `primitives` from scratch.
    ///
    /// Leaf payloads are indices into `primitives`.
    #[tracing::instrument(skip_all, fields(prim_count = primitives.len()))]
    pub fn build<P: BvhPrimitive<V>>(&mut self, primitives: &[P]) -> Result<()> {
        let required = Self::required_capacity(primitives.len());
        if self.nodes.len() < required {
            return Err(Error::TreeCapacity {
                required,
                capacity: self.nodes.len(),
            });
        }

        self.nodes.fill(BvhNode::Empty);
        self.height = 0;
        self.leaf_count = 0;

        let bounds: Vec<Aabb<V>> = primitives.iter().map(|p| p.bounds()).collect();
        let keys: Vec<V> = primitives.iter().map(|p| p.sort_key()).collect();
        let mut indices: Vec<usize> = (0..primitives.len()).collect();

        self.subdivide(&bounds, &keys, &mut indices, ROOT, 0);

        tracing::debug!(
            height = self.height,
            leaves = self.leaf_count,
            "bvh built"
        );
        Ok(())
    }

    fn subdivide(
        &mut self,
        bounds: &[Aabb<V>],
        keys: &[V],
        indices: &mut [usize],
        node: usize,
        depth: usize,
    ) {
        match indices.len() {
            0 => {}
            1 => {
                let primitive = indices[0];
                self.nodes[node] = BvhNode::Leaf {
                    bounds: bounds[primitive],
                    primitive,
                };
                self.height = self.height.max(depth);
                self.leaf_count += 1;
            }
            count => {
                let mut node_bounds = Aabb::empty();
                for &idx in indices.iter() {
                    node_bounds.expand_by_box(&bounds[idx]);
                }

                let axis = node_bounds.largest_axis();

                // Stable, so equal keys keep their relative order
                indices.sort_by(|&a, &b| keys[a].axis(axis).total_cmp(&keys[b].axis(axis)));

                let mid = count / 2;
                let (lower, upper) = indices.split_at_mut(mid);

                self.nodes[node] = BvhNode::Internal {
                    bounds: node_bounds,
                    axis,
                };
                self.height = self.height.max(depth);

                self.subdivide(bounds, keys, upper, node * 2, depth + 1);
                self.subdivide(bounds, keys, lower, node * 2 + 1, depth + 1);
            }
        }
    }

    /// Node at slot `k`; slots beyond capacity read as empty.
    #[inline]
    pub fn node(&self, k: usize) -> BvhNode<V> {
        self.nodes.get(k).copied().unwrap_or(BvhNode::Empty)
    }

    /// All slots, including the unused slot 0.
    #[inline]
    pub fn nodes(&self) -> &[BvhNode<V>] {
        &self.nodes
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Bounds of the whole tree, `None` before the first non-empty build.
    pub fn root_bounds(&self) -> Option<&Aabb<V>> {
        self.nodes.get(ROOT).and_then(BvhNode::bounds)
    }
}
