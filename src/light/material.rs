//! Material capability consumed by the light index.
//!
//! Shading is out of scope here; the tracer only needs to know whether a
//! material emits.

use crate::util::Vec3;

/// Anything that can estimate its emitted radiance.
pub trait Material {
    /// Rough emitted radiance. Any positive channel marks the material as
    /// a light.
    fn estimate_emission(&self) -> Vec3;

    #[inline]
    fn is_emissive(&self) -> bool {
        self.estimate_emission().cmpgt(Vec3::ZERO).any()
    }
}

/// Lookup from material id to material.
pub trait MaterialTable: Sync {
    type Material: Material;

    fn get(&self, id: u32) -> Option<&Self::Material>;
}

impl<M: Material + Sync> MaterialTable for [M] {
    type Material = M;

    #[inline]
    fn get(&self, id: u32) -> Option<&M> {
        <[M]>::get(self, id as usize)
    }
}

impl<M: Material + Sync> MaterialTable for Vec<M> {
    type Material = M;

    #[inline]
    fn get(&self, id: u32) -> Option<&M> {
        self.as_slice().get(id as usize)
    }
}

/// Plain diffuse-or-emissive material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMaterial {
    pub color: Vec3,
    pub emission: Vec3,
}

impl BasicMaterial {
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            emission: Vec3::ZERO,
        }
    }

    pub fn emissive(emission: Vec3) -> Self {
        Self {
            color: Vec3::ZERO,
            emission,
        }
    }
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self::diffuse(Vec3::splat(0.8))
    }
}

impl Material for BasicMaterial {
    #[inline]
    fn estimate_emission(&self) -> Vec3 {
        self.emission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_emissive() {
        assert!(!BasicMaterial::default().is_emissive());
        assert!(BasicMaterial::emissive(Vec3::new(0.0, 0.0, 2.0)).is_emissive());
        // Negative radiance is not emission
        assert!(!BasicMaterial::emissive(Vec3::new(-1.0, 0.0, 0.0)).is_emissive());
    }

    #[test]
    fn test_table_lookup() {
        let table = vec![BasicMaterial::default(), BasicMaterial::emissive(Vec3::ONE)];
        assert!(MaterialTable::get(&table, 1).unwrap().is_emissive());
        assert!(MaterialTable::get(&table, 2).is_none());
        assert!(MaterialTable::get(table.as_slice(), 0).is_some());
    }
}
