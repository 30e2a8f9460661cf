//! Emissive surfaces: which faces emit, and picking points on them.
//!
//! ## Architecture
//! ```text
//! TriangleStore + MaterialTable → EmissiveIndex::rebuild → emissive face list
//! EmissiveIndex + reference point → sample_light_position → LightSample
//! ```

pub mod emissive;
pub mod material;
pub mod sampler;

pub use emissive::EmissiveIndex;
pub use material::{BasicMaterial, Material, MaterialTable};
pub use sampler::{sample_light_position, LightSample};
