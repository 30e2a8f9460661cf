//! Parallel index of emissive faces.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::material::{Material, MaterialTable};
use crate::geom::TriangleStore;

/// Faces whose material emits, in no particular order.
///
/// Rebuilt from scratch by [`rebuild`](Self::rebuild); never patched.
#[derive(Debug)]
pub struct EmissiveIndex {
    slots: Box<[AtomicUsize]>,
    count: usize,
}

impl EmissiveIndex {
    /// Index able to hold up to `max_faces` entries.
    pub fn new(max_faces: usize) -> Self {
        Self {
            slots: Self::alloc_slots(max_faces),
            count: 0,
        }
    }

    fn alloc_slots(len: usize) -> Box<[AtomicUsize]> {
        (0..len).map(|_| AtomicUsize::new(0)).collect()
    }

    /// Forget every entry without rescanning.
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Rescan every face of `store` against `materials`.
    ///
    /// Each emissive face claims a slot with an atomic increment, so it is
    /// recorded exactly once whatever the scheduling. Faces whose material
    /// id is absent from the table are treated as non-emissive. The index
    /// grows to the store's capacity if it was allocated smaller.
    #[tracing::instrument(skip_all, fields(faces = store.face_count()))]
    pub fn rebuild<T: MaterialTable + ?Sized>(&mut self, store: &TriangleStore, materials: &T) -> usize {
        if self.slots.len() < store.face_count() {
            tracing::debug!(
                from = self.slots.len(),
                to = store.max_faces(),
                "growing emissive index to store capacity"
            );
            self.slots = Self::alloc_slots(store.max_faces());
        }

        let next = AtomicUsize::new(0);
        let missing = AtomicUsize::new(0);
        let slots = &self.slots;

        (0..store.face_count()).into_par_iter().for_each(|face| {
            match materials.get(store.material_id(face)) {
                Some(m) if m.is_emissive() => {
                    let j = next.fetch_add(1, Ordering::Relaxed);
                    slots[j].store(face, Ordering::Relaxed);
                }
                Some(_) => {}
                None => {
                    missing.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let missing = missing.into_inner();
        if missing > 0 {
            tracing::warn!(missing, "faces reference materials absent from the table");
        }

        self.count = next.into_inner();
        tracing::debug!(emissive = self.count, "emissive index rebuilt");
        self.count
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Face stored in entry `i < len()`.
    #[inline]
    pub fn face(&self, i: usize) -> usize {
        debug_assert!(i < self.count);
        self.slots[i].load(Ordering::Relaxed)
    }

    /// All emissive faces.
    pub fn faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots[..self.count].iter().map(|s| s.load(Ordering::Relaxed))
    }
}
