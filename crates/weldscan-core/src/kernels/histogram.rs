//! Histogram-based contrast operators on 8-bit intensities.

use crate::{Field, InvalidInputError};

const BINS: usize = 256;

#[inline]
fn bin(v: f32) -> usize {
    v.round().clamp(0.0, 255.0) as usize
}

fn histogram<'a>(values: impl Iterator<Item = &'a f32>) -> [u32; BINS] {
    let mut hist = [0u32; BINS];
    for &v in values {
        hist[bin(v)] += 1;
    }
    hist
}

/// 256-bin histogram of the rounded, clamped samples.
pub fn intensity_histogram(field: &Field) -> [u32; BINS] {
    histogram(field.data().iter())
}

/// Global histogram equalization.
///
/// The darkest occupied level maps to 0 and the cumulative count of the
/// remaining levels is stretched to 255. A field holding a single level is
/// returned unchanged (after 8-bit quantization).
pub fn equalize_histogram(field: &Field) -> Field {
    let hist = intensity_histogram(field);
    let total = field.len() as u32;
    let Some(first) = hist.iter().position(|&c| c > 0) else {
        return field.quantized();
    };
    if hist[first] == total {
        return field.quantized();
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut lut = [0.0f32; BINS];
    let mut sum = 0u32;
    for i in first + 1..BINS {
        sum += hist[i];
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0);
    }
    field.map(|v| lut[bin(v)])
}

/// Contrast-limited adaptive histogram equalization.
///
/// The field is split into `tiles.0 x tiles.1` tiles of `ceil(W / tx) x
/// ceil(H / ty)` pixels (samples past the border are clamped). Each tile
/// histogram is clipped at `max(1, clip_limit * tile_area / 256)`, the excess
/// is spread evenly over all bins, and the resulting per-tile lookup tables are
/// blended bilinearly between tile centers.
pub fn clahe(
    field: &Field,
    clip_limit: f32,
    tiles: (usize, usize),
) -> Result<Field, InvalidInputError> {
    if !(clip_limit.is_finite() && clip_limit > 0.0) {
        return Err(InvalidInputError::InvalidParameter {
            name: "clip_limit",
            value: clip_limit as f64,
        });
    }
    let (tiles_x, tiles_y) = tiles;
    if tiles_x == 0 || tiles_y == 0 {
        return Err(InvalidInputError::InvalidParameter {
            name: "tiles",
            value: tiles_x.min(tiles_y) as f64,
        });
    }

    let (w, h) = (field.width(), field.height());
    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;
    let clip = ((clip_limit * tile_area as f32 / BINS as f32) as u32).max(1);
    let lut_scale = 255.0 / tile_area as f32;

    let mut luts = vec![[0u8; BINS]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for yy in ty * tile_h..(ty + 1) * tile_h {
                for xx in tx * tile_w..(tx + 1) * tile_w {
                    hist[bin(field.get(xx.min(w - 1), yy.min(h - 1)))] += 1;
                }
            }
            clip_histogram(&mut hist, clip);

            let lut = &mut luts[ty * tiles_x + tx];
            let mut sum = 0u32;
            for (entry, &count) in lut.iter_mut().zip(&hist) {
                sum += count;
                *entry = (sum as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let neighbours = |pos: usize, inv: f32, count: usize| {
        let t = pos as f32 * inv - 0.5;
        let t1 = t.floor();
        let frac = t - t1;
        let t1 = t1 as isize;
        let lo = t1.max(0) as usize;
        let hi = ((t1 + 1) as usize).min(count - 1);
        (lo, hi, frac)
    };

    Ok(Field::from_fn(w, h, |x, y| {
        let v = bin(field.get(x, y));
        let (tx1, tx2, xa) = neighbours(x, inv_tw, tiles_x);
        let (ty1, ty2, ya) = neighbours(y, inv_th, tiles_y);
        let at = |tx: usize, ty: usize| luts[ty * tiles_x + tx][v] as f32;
        let top = at(tx1, ty1) * (1.0 - xa) + at(tx2, ty1) * xa;
        let bottom = at(tx1, ty2) * (1.0 - xa) + at(tx2, ty2) * xa;
        (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0)
    }))
}

fn clip_histogram(hist: &mut [u32; BINS], clip: u32) {
    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }
    let per_bin = excess / BINS as u32;
    let mut residual = excess - per_bin * BINS as u32;
    for count in hist.iter_mut() {
        *count += per_bin;
    }
    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equalization_stretches_two_levels_to_full_range() {
        let f = Field::from_rows(&[vec![100.0, 100.0, 120.0, 120.0]]).expect("valid");
        let eq = equalize_histogram(&f);
        assert_eq!(eq.data(), &[0.0, 0.0, 255.0, 255.0]);
    }

    #[test]
    fn equalization_keeps_single_level_field() {
        let f = Field::filled(4, 4, 93.0).expect("valid");
        assert_eq!(equalize_histogram(&f), f);
    }

    #[test]
    fn clip_histogram_preserves_total_count() {
        let mut hist = [0u32; BINS];
        hist[10] = 1000;
        hist[200] = 30;
        clip_histogram(&mut hist, 40);
        assert_eq!(hist.iter().sum::<u32>(), 1030);
        assert!(hist[10] < 1000);
    }

    #[test]
    fn clahe_is_monotone_and_in_range() {
        let f = Field::from_fn(32, 32, |x, y| ((x * 3 + y) % 160) as f32 + 40.0);
        let out = clahe(&f, 2.0, (4, 4)).expect("valid params");
        assert_eq!((out.width(), out.height()), (32, 32));
        assert!(out.data().iter().all(|&v| (0.0..=255.0).contains(&v)));
        // Within one tile, brighter input never maps to darker output.
        assert!(out.get(1, 0) >= out.get(0, 0));
        assert!(clahe(&f, 0.0, (4, 4)).is_err());
        assert!(clahe(&f, 2.0, (0, 4)).is_err());
    }

    #[test]
    fn clahe_handles_fields_smaller_than_the_grid() {
        let f = Field::from_fn(3, 2, |x, _| (x * 50) as f32);
        let out = clahe(&f, 2.0, (8, 8)).expect("valid params");
        assert_eq!(out.len(), 6);
    }
}
