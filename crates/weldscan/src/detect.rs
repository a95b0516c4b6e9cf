use std::path::Path;

use ::image::{DynamicImage, GrayImage, ImageReader};
use weldscan_core::{Field, GrayImageView, InvalidInputError};
use weldscan_detect::{DefectDetector, DetectError, Detection, EnhancementMode};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the image-file helpers.
#[derive(thiserror::Error, Debug)]
pub enum ImageDetectError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Borrow an `image::GrayImage` as the lightweight `weldscan-core` view type.
pub fn gray_view(img: &GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Convert a decoded image into an intensity field.
///
/// Gray images are copied as is. Anything with color goes through 8-bit RGB
/// and the core luma weights, so results do not depend on the `image` crate's
/// own grayscale conversion.
pub fn field_from_image(img: &DynamicImage) -> Result<Field, InvalidInputError> {
    match img {
        DynamicImage::ImageLuma8(gray) => Field::from_view(&gray_view(gray)),
        img if !img.color().has_color() => Field::from_view(&gray_view(&img.to_luma8())),
        img => {
            let rgb = img.to_rgb8();
            Field::from_interleaved_u8(
                rgb.width() as usize,
                rgb.height() as usize,
                3,
                rgb.as_raw(),
            )
        }
    }
}

/// Decode an image file into an intensity field.
pub fn load_field(path: impl AsRef<Path>) -> Result<Field, ImageDetectError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(field_from_image(&img)?)
}

/// Run `detector` on an already decoded image.
pub fn detect_image(
    img: &DynamicImage,
    detector: &DefectDetector,
    mode: EnhancementMode,
    confidence_threshold: f32,
) -> Result<Vec<Detection>, ImageDetectError> {
    let field = field_from_image(img)?;
    Ok(detector.detect(&field, mode, confidence_threshold)?)
}

/// Load `path` and run `detector` on it; the decoded field is returned too.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(path, detector), fields(path = %path.as_ref().display()))
)]
pub fn detect_file(
    path: impl AsRef<Path>,
    detector: &DefectDetector,
    mode: EnhancementMode,
    confidence_threshold: f32,
) -> Result<(Field, Vec<Detection>), ImageDetectError> {
    let field = load_field(path.as_ref())?;
    let detections = detector.detect(&field, mode, confidence_threshold)?;
    Ok((field, detections))
}
