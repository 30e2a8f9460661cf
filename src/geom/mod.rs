//! Triangle geometry: mesh input, per-face storage, and triangle math.

use crate::util::{Error, Result};

pub mod mesh;
pub mod store;
pub mod triangle;

pub use mesh::{IndexedMesh, Mesh};
pub use store::TriangleStore;
pub use triangle::{ray_triangle_hit, SurfaceGeometry, TriangleHit};

/// Reinterpret a flat float buffer as per-face records of `stride` floats.
///
/// Fails with [`Error::InvalidLayout`] when `data` is not a whole number of
/// records.
#[inline]
pub fn safe_cast_faces<T: bytemuck::Pod>(data: &[f32]) -> Result<&[T]> {
    let stride = std::mem::size_of::<T>() / std::mem::size_of::<f32>();
    bytemuck::try_cast_slice(data).map_err(|_| Error::InvalidLayout {
        len: data.len(),
        stride,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_cast_faces() {
        let flat = [0.0f32; 18];
        let faces: &[[[f32; 3]; 3]] = safe_cast_faces(&flat).unwrap();
        assert_eq!(faces.len(), 2);

        let err = safe_cast_faces::<[[f32; 3]; 3]>(&flat[..10]).unwrap_err();
        assert!(matches!(err, Error::InvalidLayout { len: 10, stride: 9 }));
    }
}
