use crate::{Field, InvalidInputError};

/// Median over a `size x size` window.
///
/// Only interior pixels are filtered: anything closer than `size / 2` to the
/// border keeps its input value. `size` must be odd.
pub fn median_filter(field: &Field, size: usize) -> Result<Field, InvalidInputError> {
    if size == 0 || size % 2 == 0 {
        return Err(InvalidInputError::InvalidKernel {
            width: size,
            height: size,
        });
    }
    let (w, h) = (field.width(), field.height());
    let pad = size / 2;
    if w <= 2 * pad || h <= 2 * pad {
        return Ok(field.clone());
    }
    let mut out = field.data().to_vec();

    let mut window = Vec::with_capacity(size * size);
    let mid = size * size / 2;
    for y in pad..h - pad {
        for x in pad..w - pad {
            window.clear();
            for yy in y - pad..=y + pad {
                window.extend_from_slice(&field.row(yy)[x - pad..=x + pad]);
            }
            let (_, median, _) = window.select_nth_unstable_by(mid, f32::total_cmp);
            out[y * w + x] = *median;
        }
    }
    Ok(Field::from_parts(w, h, out))
}
