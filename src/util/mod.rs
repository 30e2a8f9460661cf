//! Utility types and functions shared by the tracer.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the [`Axes`] abstraction

mod error;
mod math;

pub use error::*;
pub use math::*;
