use serde::{Deserialize, Serialize};

use super::convolve::{convolve, gaussian_kernel_sigma};
use crate::{Field, InvalidInputError, Mask};

/// Full-scale intensity used to normalize fields into `[0, 1]`.
pub const INTENSITY_MAX: f32 = 255.0;

/// Which side of a threshold counts as foreground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Foreground is darker than the threshold.
    Dark,
    /// Foreground is brighter than the threshold.
    Bright,
}

/// Global threshold on the normalized field (`value / 255`).
///
/// `Dark` marks samples strictly below `threshold`, `Bright` samples strictly
/// above it.
pub fn binary_threshold(field: &Field, threshold: f32, polarity: Polarity) -> Mask {
    let (w, h) = (field.width(), field.height());
    Mask::from_fn(w, h, |x, y| {
        let v = field.get(x, y) / INTENSITY_MAX;
        match polarity {
            Polarity::Dark => v < threshold,
            Polarity::Bright => v > threshold,
        }
    })
}

/// Local threshold against a Gaussian-weighted neighbourhood mean.
///
/// `block` is the (odd) window size, the Gaussian sigma follows the usual
/// `0.3 * ((block - 1) * 0.5 - 1) + 0.8` rule. `Dark` marks
/// `value <= mean - c`, `Bright` marks `value > mean + c`.
pub fn adaptive_threshold(
    field: &Field,
    block: usize,
    c: f32,
    polarity: Polarity,
) -> Result<Mask, InvalidInputError> {
    if block < 3 || block % 2 == 0 {
        return Err(InvalidInputError::InvalidKernel {
            width: block,
            height: block,
        });
    }
    let sigma = 0.3 * ((block as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = convolve(field, &gaussian_kernel_sigma(block, sigma)?);
    let (w, h) = (field.width(), field.height());
    Ok(Mask::from_fn(w, h, |x, y| {
        let v = field.get(x, y);
        let m = local_mean.get(x, y);
        match polarity {
            Polarity::Dark => v <= m - c,
            Polarity::Bright => v > m + c,
        }
    }))
}
