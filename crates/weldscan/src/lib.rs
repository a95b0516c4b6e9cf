//! High-level facade crate for the `weldscan-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the numeric core and the detection pipeline
//! - (feature-gated) helpers that decode an image file with the `image` crate,
//!   convert it to a grayscale [`Field`] and run the detector on it
//! - the `weldscan` command-line tool (feature `cli`)
//!
//! ## Quickstart
//!
//! ```no_run
//! use weldscan::detect;
//! use weldscan::{DefectDetector, EnhancementMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = DefectDetector::default();
//! let (field, detections) =
//!     detect::detect_file("weld.png", &detector, EnhancementMode::Standard, 0.5)?;
//! println!("{}x{}: {} defects", field.width(), field.height(), detections.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `weldscan::core`: fields, masks, kernels and region operations.
//! - `weldscan::pipeline`: enhancement, detectors, NMS, scoring and reports.
//! - `weldscan::detect` (feature `image`): end-to-end helpers from image files.

pub use weldscan_core as core;
pub use weldscan_detect as pipeline;

pub use weldscan_core::{BoundingBox, Field, InvalidInputError};
pub use weldscan_detect::{
    summarize, DefectClass, DefectDetector, DetectConfig, DetectError, DetectReport, Detection,
    DetectionSummary, DetectorParams, DetectorStrategy, EnhancementMode, RiskLevel, Severity,
};

#[cfg(feature = "image")]
pub mod detect;
