//! Preprocessing profiles applied once per image before detection.
//!
//! Every profile is a pure `Field -> Field` map. Intermediate stages are
//! rounded to 8-bit intensities where an 8-bit image would be stored, so the
//! output always holds integers in `0..=255`.

use log::debug;
#[cfg(feature = "tracing")]
use tracing::instrument;
use weldscan_core::kernels::{
    bilateral_filter, clahe, close_gray, equalize_histogram, gaussian_blur, gaussian_blur_sigma,
    laplacian, sobel_gradient_magnitude, StructuringElement,
};
use weldscan_core::Field;

use crate::params::EnhanceParams;
use crate::types::EnhancementMode;
use crate::DetectError;

/// Apply the selected enhancement profile.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, params),
        fields(width = image.width(), height = image.height(), mode = %mode)
    )
)]
pub fn enhance(
    image: &Field,
    mode: EnhancementMode,
    params: &EnhanceParams,
) -> Result<Field, DetectError> {
    let gray = image.quantized();
    let out = match mode {
        EnhancementMode::Standard => standard(&gray, params)?,
        EnhancementMode::Advanced => advanced(&gray, params)?,
        EnhancementMode::HighSensitivity => high_sensitivity(&gray, params)?,
    };
    let (lo, hi) = out.min_max();
    debug!("enhanced {}x{} with {mode}: range {lo}..{hi}", out.width(), out.height());
    Ok(out)
}

fn standard(gray: &Field, params: &EnhanceParams) -> Result<Field, DetectError> {
    let equalized = equalize_histogram(gray);
    Ok(gaussian_blur(&equalized, params.standard_blur_size)?.quantized())
}

fn advanced(gray: &Field, params: &EnhanceParams) -> Result<Field, DetectError> {
    let equalized = clahe(gray, params.advanced_clip_limit, params.advanced_tiles)?;

    let blurred = gaussian_blur_sigma(&equalized, 0, params.unsharp_sigma)?.quantized();
    let amount = params.unsharp_amount;
    let sharpened = equalized
        .zip_map(&blurred, |e, b| amount * e - (amount - 1.0) * b)?
        .quantized();

    let smoothed = bilateral_filter(
        &sharpened,
        params.bilateral_diameter,
        params.bilateral_sigma_color,
        params.bilateral_sigma_space,
    )?
    .quantized();

    let size = params.advanced_close_size;
    let element = StructuringElement::ellipse(size, size)?;
    Ok(close_gray(&smoothed, &element))
}

fn high_sensitivity(gray: &Field, params: &EnhanceParams) -> Result<Field, DetectError> {
    let local = clahe(gray, params.sensitive_clip_limit, params.sensitive_tiles)?;
    let edges = laplacian(gray).map(|v| v.abs().min(255.0).floor());

    let magnitude = sobel_gradient_magnitude(gray);
    let (_, peak) = magnitude.min_max();
    let gradient = if peak > 0.0 {
        magnitude.map(|v| (v * 255.0 / peak).floor())
    } else {
        magnitude.map(|_| 0.0)
    };

    let [w_local, w_edges, w_gradient] = params.sensitive_weights;
    let combined = local
        .zip_map(&edges, |a, b| w_local * a + w_edges * b)?
        .zip_map(&gradient, |acc, g| {
            (acc + w_gradient * g).clamp(0.0, 255.0).floor()
        })?;
    Ok(gaussian_blur(&combined, params.sensitive_blur_size)?.quantized())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured() -> Field {
        let data = (0..40 * 30)
            .map(|i| {
                let (x, y) = (i % 40, i / 40);
                let stripe = if (x / 5) % 2 == 0 { 90.0 } else { 150.0 };
                stripe + ((x * 7 + y * 13) % 11) as f32
            })
            .collect();
        Field::new(40, 30, data).expect("valid")
    }

    #[test]
    fn every_profile_keeps_shape_and_8bit_range() {
        let f = textured();
        for mode in EnhancementMode::ALL {
            let out = enhance(&f, mode, &EnhanceParams::default()).expect("valid params");
            assert_eq!((out.width(), out.height()), (40, 30), "{mode}");
            assert!(
                out.data()
                    .iter()
                    .all(|&v| (0.0..=255.0).contains(&v) && v.fract() == 0.0),
                "{mode}"
            );
        }
    }

    #[test]
    fn uniform_field_stays_uniform() {
        let f = Field::filled(24, 24, 180.0).expect("valid");
        for mode in EnhancementMode::ALL {
            let out = enhance(&f, mode, &EnhanceParams::default()).expect("valid params");
            let (lo, hi) = out.min_max();
            assert_eq!(lo, hi, "{mode}");
        }
    }

    #[test]
    fn standard_profile_on_equalized_input_only_blurs() {
        let params = EnhanceParams::default();
        let equalized = equalize_histogram(&textured());
        let again = enhance(&equalized, EnhancementMode::Standard, &params).expect("valid");
        let blurred = gaussian_blur(&equalized, params.standard_blur_size)
            .expect("odd size")
            .quantized();
        let worst = again
            .data()
            .iter()
            .zip(blurred.data())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(worst <= 1.0, "max deviation {worst}");
    }

    #[test]
    fn invalid_params_surface_as_errors() {
        let params = EnhanceParams {
            standard_blur_size: 4,
            ..EnhanceParams::default()
        };
        assert!(enhance(&textured(), EnhancementMode::Standard, &params).is_err());
    }
}
