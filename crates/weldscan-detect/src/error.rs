use weldscan_core::InvalidInputError;

/// Errors produced by the detection pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("confidence threshold {0} outside [0, 1]")]
    InvalidConfidenceThreshold(f32),

    #[error("invalid scale factor {0} (must be finite and > 0)")]
    InvalidScale(f32),

    #[error("no scale factors configured")]
    NoScales,
}
