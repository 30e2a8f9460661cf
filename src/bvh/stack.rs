//! Fixed-capacity traversal stacks, one slot per in-flight ray.
//!
//! All slots live in one flat buffer of `slots * depth` entries, the same
//! layout a GPU kernel would use for per-invocation scratch memory. A slot
//! is only reachable through a [`StackSlot`], which mutably borrows its
//! part of the buffer, so two concurrent traversals can never share one.

use rayon::prelude::*;

use crate::util::{Error, Result};

/// Pool of `slots` independent LIFO stacks, each holding up to `depth` node
/// indices.
#[derive(Debug, Clone)]
pub struct StackPool {
    values: Vec<usize>,
    lens: Vec<usize>,
    depth: usize,
}

impl StackPool {
    /// Allocate `slots` stacks of capacity `depth`.
    ///
    /// # Panics
    /// If `slots` or `depth` is zero.
    pub fn new(slots: usize, depth: usize) -> Self {
        assert!(slots > 0 && depth > 0, "stack pool needs at least one slot of non-zero depth");
        Self {
            values: vec![0; slots * depth],
            lens: vec![0; slots],
            depth,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn slots(&self) -> usize {
        self.lens.len()
    }

    /// Capacity of every slot.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current length of `slot`.
    #[inline]
    pub fn size(&self, slot: usize) -> usize {
        self.lens[slot]
    }

    /// Push onto `slot`. Panics if the slot is full.
    #[inline]
    pub fn push(&mut self, slot: usize, value: usize) {
        self.slot(slot).push(value);
    }

    /// Pop from `slot`.
    #[inline]
    pub fn pop(&mut self, slot: usize) -> Option<usize> {
        self.slot(slot).pop()
    }

    /// Exclusive handle to one slot.
    pub fn slot(&mut self, slot: usize) -> StackSlot<'_> {
        let start = slot * self.depth;
        StackSlot {
            values: &mut self.values[start..start + self.depth],
            len: &mut self.lens[slot],
        }
    }

    /// Handles to every slot at once.
    pub fn slots_mut(&mut self) -> impl Iterator<Item = StackSlot<'_>> {
        self.values
            .chunks_mut(self.depth)
            .zip(self.lens.iter_mut())
            .map(|(values, len)| StackSlot { values, len })
    }

    /// Handles to every slot, for use from rayon workers.
    pub fn par_slots_mut(&mut self) -> impl IndexedParallelIterator<Item = StackSlot<'_>> {
        self.values
            .par_chunks_mut(self.depth)
            .zip(self.lens.par_iter_mut())
            .map(|(values, len)| StackSlot { values, len })
    }
}

/// One stack of a [`StackPool`].
#[derive(Debug)]
pub struct StackSlot<'a> {
    values: &'a mut [usize],
    len: &'a mut usize,
}

impl StackSlot<'_> {
    #[inline]
    pub fn size(&self) -> usize {
        *self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        *self.len = 0;
    }

    /// Push a value.
    ///
    /// # Panics
    /// When the slot is full. Required depth is fixed by the tree height,
    /// so running out means the pool was sized wrong, not that the ray was
    /// unusual.
    #[inline]
    pub fn push(&mut self, value: usize) {
        if let Err(e) = self.try_push(value) {
            panic!("{e}: pool depth is smaller than the tree requires");
        }
    }

    /// Push a value, reporting overflow instead of panicking.
    #[inline]
    pub fn try_push(&mut self, value: usize) -> Result<()> {
        let len = *self.len;
        if len >= self.values.len() {
            return Err(Error::StackOverflow {
                capacity: self.values.len(),
            });
        }
        self.values[len] = value;
        *self.len = len + 1;
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        let len = *self.len;
        if len == 0 {
            return None;
        }
        *self.len = len - 1;
        Some(self.values[len - 1])
    }
}
