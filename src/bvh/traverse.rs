//! Stack-driven BVH traversal.

use super::{Bvh, BvhNode, StackSlot, ROOT};
use crate::util::Axes;

impl<V: Axes> Bvh<V> {
    /// Walk every node whose box the ray crosses and report each leaf's
    /// primitive to `visit`.
    ///
    /// Leaves come out in no particular distance order, so the caller has
    /// to test all of them to find the closest hit. Returns the number of
    /// non-empty nodes whose boxes were tested.
    pub fn hit(
        &self,
        stack: &mut StackSlot<'_>,
        ro: V,
        rd: V,
        eps: f32,
        inf: f32,
        mut visit: impl FnMut(usize),
    ) -> usize {
        let mut tested = 0;

        stack.clear();
        stack.push(ROOT);

        while let Some(curr) = stack.pop() {
            let (bounds, primitive) = match self.node(curr) {
                BvhNode::Empty => continue,
                BvhNode::Leaf { bounds, primitive } => (bounds, Some(primitive)),
                BvhNode::Internal { bounds, .. } => (bounds, None),
            };

            tested += 1;
            if !bounds.ray_hit(ro, rd, eps, inf) {
                continue;
            }

            match primitive {
                Some(primitive) => visit(primitive),
                None => {
                    stack.push(curr * 2);
                    stack.push(curr * 2 + 1);
                }
            }
        }

        tested
    }

    /// Collect the candidate primitives for a ray.
    pub fn candidates(&self, stack: &mut StackSlot<'_>, ro: V, rd: V, eps: f32, inf: f32) -> Vec<usize> {
        let mut out = Vec::new();
        self.hit(stack, ro, rd, eps, inf, |p| out.push(p));
        out
    }
}
