//! # tritrace
//!
//! Spatial core of a triangle ray tracer: a bounding volume hierarchy over
//! scene faces, bounded per-ray traversal stacks, exact ray/triangle hits,
//! surface attribute interpolation and emissive-face sampling for direct
//! lighting.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports, tolerances
//! - [`bvh`] - Boxes, the median-split builder, traversal stacks and traversal
//! - [`geom`] - Mesh input, triangle storage and triangle math
//! - [`light`] - Materials, the emissive face index and the light sampler
//! - [`tracer`] - [`TriangleTracer`] tying the above together, and its config
//!
//! ## Example
//!
//! ```ignore
//! use tritrace::prelude::*;
//!
//! let mut tracer = TriangleTracer::new(TracerConfig::with_max_faces(1024))?;
//! tracer.add_object(&IndexedMesh::quad(Vec3::ZERO, Vec3::X, Vec3::Y), 0);
//! tracer.update()?;
//!
//! if let Some(hit) = tracer.hit(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z) {
//!     let geo = tracer.calc_geometry(&hit);
//!     println!("face {} at {} normal {}", hit.face, hit.distance, geo.normal);
//! }
//! ```

pub mod util;
pub mod bvh;
pub mod geom;
pub mod light;
pub mod tracer;

// Re-export commonly used types
pub use util::{Error, Result};
pub use tracer::{Hit, Ray, TracerConfig, TriangleTracer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Mat4, Vec2, Vec3, EPS, INF};
    pub use crate::bvh::{Aabb, Bvh, BvhNode, StackPool, StackSlot};
    pub use crate::geom::{IndexedMesh, Mesh, SurfaceGeometry, TriangleStore};
    pub use crate::light::{BasicMaterial, EmissiveIndex, LightSample, Material, MaterialTable};
    pub use crate::tracer::{Hit, Ray, TracerConfig, TriangleTracer};
}
