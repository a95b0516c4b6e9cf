//! Canny edge detector over 8-bit intensities.

use super::gradient::sobel_gradients;
use crate::{Field, InvalidInputError, Mask};

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    None,
    Weak,
    Strong,
}

/// Canny edges with hysteresis thresholds `low < high`.
///
/// The input is rounded to 8-bit first. Gradients come from the 3x3 Sobel
/// pair, magnitude is L2, non-maximum suppression compares against the two
/// neighbours across the quantized (0/45/90/135 degree) edge normal, and weak
/// pixels survive only when 8-connected to a strong one.
pub fn canny(field: &Field, low: f32, high: f32) -> Result<Mask, InvalidInputError> {
    for (name, value) in [("low", low), ("high", high)] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(InvalidInputError::InvalidParameter {
                name,
                value: value as f64,
            });
        }
    }
    let (low, high) = if low > high { (high, low) } else { (low, high) };

    let (w, h) = (field.width(), field.height());
    let grads = sobel_gradients(&field.quantized());
    let mag = grads.magnitude();
    let mag_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            mag.get(x as usize, y as usize)
        }
    };

    let mut state = vec![EdgeState::None; w * h];
    let mut stack = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let m = mag.get(x, y);
            if m <= low {
                continue;
            }
            let gx = grads.gx.get(x, y);
            let gy = grads.gy.get(x, y);
            let (ax, ay) = (gx.abs(), gy.abs());
            let (xi, yi) = (x as isize, y as isize);
            let is_peak = if ay < ax * TAN_22_5 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s: isize = if (gx < 0.0) != (gy < 0.0) { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };
            if !is_peak {
                continue;
            }
            if m > high {
                state[y * w + x] = EdgeState::Strong;
                stack.push((x, y));
            } else {
                state[y * w + x] = EdgeState::Weak;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let idx = ny * w + nx;
                if state[idx] == EdgeState::Weak {
                    state[idx] = EdgeState::Strong;
                    stack.push((nx, ny));
                }
            }
        }
    }

    Ok(Mask::from_fn(w, h, |x, y| {
        state[y * w + x] == EdgeState::Strong
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_yields_a_thin_vertical_edge() {
        let f = Field::from_fn(12, 10, |x, _| if x < 6 { 20.0 } else { 220.0 });
        let edges = canny(&f, 50.0, 150.0).expect("valid thresholds");
        for y in 0..10 {
            let row: Vec<usize> = (0..12).filter(|&x| edges.get(x, y)).collect();
            assert_eq!(row, vec![5], "row {y}");
        }
    }

    #[test]
    fn flat_field_has_no_edges() {
        let f = Field::filled(8, 8, 128.0).expect("valid");
        assert_eq!(canny(&f, 30.0, 100.0).expect("valid").count(), 0);
    }

    #[test]
    fn weak_edges_need_a_strong_neighbour() {
        // A faint step alone stays below `high` and is dropped.
        let f = Field::from_fn(12, 6, |x, _| if x < 6 { 100.0 } else { 120.0 });
        assert_eq!(canny(&f, 50.0, 150.0).expect("valid").count(), 0);
        assert!(canny(&f, 50.0, 70.0).expect("valid").count() > 0);
    }
}
