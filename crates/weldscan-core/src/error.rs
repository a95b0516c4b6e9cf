/// Malformed input rejected before any kernel runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    #[error("empty field")]
    Empty,

    #[error("zero-sized field (width={width}, height={height})")]
    ZeroSized { width: usize, height: usize },

    #[error("non-rectangular field: row {row} has {got} samples, expected {expected}")]
    NonRectangular {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid buffer length (expected {expected} samples, got {got})")]
    BufferLength { expected: usize, got: usize },

    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("shape mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid kernel shape {width}x{height} (dimensions must be odd and non-zero)")]
    InvalidKernel { width: usize, height: usize },

    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
