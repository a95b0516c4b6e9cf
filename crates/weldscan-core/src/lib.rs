//! Intensity fields, numeric kernels and region operations for weld defect
//! detection.
//!
//! This crate is purely numeric. It knows nothing about defect classes or
//! scoring; those live in `weldscan-detect`. Everything operates on
//! [`Field`] (row-major `f32` intensities, nominally `0..=255`) and [`Mask`]
//! (binary foreground).

mod error;
mod field;
mod geometry;
pub mod kernels;
mod logger;
mod mask;
pub mod region;

pub use error::InvalidInputError;
pub use field::{sample_bilinear, Field, GrayImageView, LUMA_WEIGHTS};
pub use geometry::{BoundingBox, PixelPoint};
pub use mask::Mask;
pub use region::{Region, RegionStats};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
pub use logger::{init_with_level, level_from_verbosity};
