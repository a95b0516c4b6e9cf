use crate::field::sample_bilinear;
use crate::{Field, InvalidInputError};

/// Output dimensions for a uniform scale factor: `floor(dim * scale)`, at least 1.
pub fn scaled_dims(width: usize, height: usize, scale: f32) -> (usize, usize) {
    let s = |v: usize| ((v as f32 * scale).floor() as usize).max(1);
    (s(width), s(height))
}

/// Resample to an explicit size with pixel-center alignment.
pub fn resize_to(field: &Field, width: usize, height: usize) -> Result<Field, InvalidInputError> {
    if width == 0 || height == 0 {
        return Err(InvalidInputError::ZeroSized { width, height });
    }
    if width == field.width() && height == field.height() {
        return Ok(field.clone());
    }
    let inv_x = field.width() as f32 / width as f32;
    let inv_y = field.height() as f32 / height as f32;
    Ok(Field::from_fn(width, height, |x, y| {
        let sx = (x as f32 + 0.5) * inv_x - 0.5;
        let sy = (y as f32 + 0.5) * inv_y - 0.5;
        sample_bilinear(field, sx, sy)
    }))
}

/// Bilinear resize by a uniform factor.
pub fn resize_bilinear(field: &Field, scale: f32) -> Result<Field, InvalidInputError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(InvalidInputError::InvalidParameter {
            name: "scale",
            value: scale as f64,
        });
    }
    let (w, h) = scaled_dims(field.width(), field.height(), scale);
    resize_to(field, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dimensions_are_floored_and_never_zero() {
        assert_eq!(scaled_dims(100, 60, 1.5), (150, 90));
        assert_eq!(scaled_dims(100, 61, 0.7), (70, 42));
        assert_eq!(scaled_dims(1, 1, 0.7), (1, 1));
    }

    #[test]
    fn unit_scale_is_identity() {
        let f = Field::from_fn(5, 4, |x, y| (x * y) as f32);
        assert_eq!(resize_bilinear(&f, 1.0).expect("valid"), f);
        assert!(resize_bilinear(&f, 0.0).is_err());
    }

    #[test]
    fn doubling_a_ramp_interpolates_between_samples() {
        let f = Field::from_rows(&[vec![0.0, 10.0, 20.0, 30.0]]).expect("valid");
        let up = resize_bilinear(&f, 2.0).expect("valid");
        assert_eq!((up.width(), up.height()), (8, 2));
        assert_relative_eq!(up.get(0, 0), 0.0);
        assert_relative_eq!(up.get(2, 0), 7.5);
        assert_relative_eq!(up.get(3, 0), 12.5);
        assert_relative_eq!(up.get(7, 0), 30.0);
    }
}
