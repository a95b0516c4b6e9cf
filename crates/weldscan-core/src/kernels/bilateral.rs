use crate::{Field, InvalidInputError};

/// Edge-preserving smoothing over a circular window of diameter `diameter`.
///
/// Each neighbour is weighted by `exp(-r^2 / 2 sigma_space^2)` for its
/// distance and `exp(-d^2 / 2 sigma_color^2)` for its intensity difference.
/// Border samples are replicated.
pub fn bilateral_filter(
    field: &Field,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<Field, InvalidInputError> {
    for (name, value) in [("sigma_color", sigma_color), ("sigma_space", sigma_space)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(InvalidInputError::InvalidParameter {
                name,
                value: value as f64,
            });
        }
    }
    if diameter == 0 {
        return Err(InvalidInputError::InvalidKernel {
            width: diameter,
            height: diameter,
        });
    }

    let radius = (diameter / 2) as isize;
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    let mut taps = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() <= radius as f32 {
                taps.push((dx, dy, (r2 * space_coeff).exp()));
            }
        }
    }

    Ok(Field::from_fn(field.width(), field.height(), |x, y| {
        let center = field.get(x, y);
        let (mut acc, mut norm) = (0.0f32, 0.0f32);
        for &(dx, dy, ws) in &taps {
            let v = field.get_clamped(x as isize + dx, y as isize + dy);
            let d = v - center;
            let wgt = ws * (d * d * color_coeff).exp();
            acc += wgt * v;
            norm += wgt;
        }
        acc / norm
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn smooths_noise_but_keeps_a_strong_step() {
        let f = Field::from_fn(20, 10, |x, y| {
            let base = if x < 10 { 30.0 } else { 220.0 };
            base + if (x + y) % 2 == 0 { 4.0 } else { -4.0 }
        });
        let out = bilateral_filter(&f, 9, 75.0, 75.0).expect("valid params");
        // Noise amplitude shrinks.
        assert!((out.get(4, 5) - 30.0).abs() < 4.0);
        // The step survives: left and right stay far apart next to the edge.
        assert!(out.get(10, 5) - out.get(9, 5) > 120.0);
    }

    #[test]
    fn constant_field_is_a_fixed_point() {
        let f = Field::filled(6, 6, 50.0).expect("valid");
        let out = bilateral_filter(&f, 9, 75.0, 75.0).expect("valid params");
        for &v in out.data() {
            assert_relative_eq!(v, 50.0, epsilon = 1e-4);
        }
        assert!(bilateral_filter(&f, 9, 0.0, 75.0).is_err());
    }
}
