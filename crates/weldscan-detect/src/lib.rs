//! Weld defect candidate detection.
//!
//! Pipeline:
//! - enhance the grayscale field with one of three profiles ([`enhance`]),
//! - run the crack, porosity and slag detectors at several scales
//!   ([`detect_multiscale`]) and map every candidate back to image pixels,
//! - drop overlapping candidates per class ([`suppress`]),
//! - score image quality around each survivor, boost its confidence, grade
//!   its risk and attach guidance text ([`post_process`]).
//!
//! [`DefectDetector`] runs all of it. The older single-scale heuristics are
//! still available as [`DetectorStrategy::Simple`].
//!
//! ```
//! use weldscan_core::Field;
//! use weldscan_detect::{DefectDetector, DetectorParams, EnhancementMode};
//!
//! let field = Field::filled(64, 64, 128.0).unwrap();
//! let detector = DefectDetector::new(DetectorParams::default());
//! let detections = detector.detect(&field, EnhancementMode::Standard, 0.5).unwrap();
//! assert!(detections.is_empty());
//! ```

mod enhance;
mod error;
mod features;
mod io;
mod multiscale;
mod nms;
mod params;
mod pipeline;
mod postprocess;
mod recommend;
mod summary;
mod types;

pub mod detectors;

pub use enhance::enhance;
pub use error::DetectError;
pub use features::{extract_features, ImageFeatures};
pub use io::{DetectConfig, DetectIoError, DetectReport};
pub use multiscale::{detect_at_scale, detect_multiscale, validate_scale};
pub use nms::suppress;
pub use params::{
    CrackParams, DetectorParams, EnhanceParams, NmsParams, PorosityParams, PostProcessParams,
    SimpleParams, SlagParams,
};
pub use pipeline::{detect, validate_confidence_threshold, DefectDetector};
pub use postprocess::{post_process, quality_score, risk_level};
pub use recommend::{GuidanceTiers, RecommendationTable};
pub use summary::{summarize, ClassCounts, DetectionSummary, OverallSeverity};
pub use types::{
    Candidate, DefectClass, Detection, DetectorStrategy, EnhancementMode, ParseNameError,
    RiskLevel, ScaleContext, Severity, ShapeDescriptors, MAX_CONFIDENCE,
};
