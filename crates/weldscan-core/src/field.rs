//! Intensity fields and borrowed 8-bit views.
//!
//! A [`Field`] is always non-empty and rectangular: every constructor
//! validates its input and returns [`InvalidInputError`] otherwise. Kernel
//! functions rely on that and are total over any `Field` they receive.

use crate::geometry::BoundingBox;
use crate::InvalidInputError;

/// Luma weights applied to interleaved RGB(A) input.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

/// Owned single-channel intensity grid (row-major, `f32` samples).
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

fn check_dims(width: usize, height: usize) -> Result<usize, InvalidInputError> {
    if width == 0 || height == 0 {
        return Err(InvalidInputError::ZeroSized { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(InvalidInputError::ZeroSized { width, height })
}

impl Field {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, InvalidInputError> {
        let expected = check_dims(width, height)?;
        if data.len() != expected {
            return Err(InvalidInputError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self, InvalidInputError> {
        let len = check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Build a field from nested rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, InvalidInputError> {
        let Some(first) = rows.first() else {
            return Err(InvalidInputError::Empty);
        };
        let width = first.len();
        let mut data = Vec::with_capacity(width * rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(InvalidInputError::NonRectangular {
                    row,
                    expected: width,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::new(width, rows.len(), data)
    }

    pub fn from_gray_u8(
        width: usize,
        height: usize,
        pixels: &[u8],
    ) -> Result<Self, InvalidInputError> {
        Self::from_interleaved_u8(width, height, 1, pixels)
    }

    /// Build a field from interleaved 8-bit pixels.
    ///
    /// Three- and four-channel input is converted to luma with
    /// [`LUMA_WEIGHTS`]; a fourth (alpha) channel is ignored.
    pub fn from_interleaved_u8(
        width: usize,
        height: usize,
        channels: usize,
        pixels: &[u8],
    ) -> Result<Self, InvalidInputError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(InvalidInputError::UnsupportedChannels(channels));
        }
        let len = check_dims(width, height)?;
        let expected = len * channels;
        if pixels.len() != expected {
            return Err(InvalidInputError::BufferLength {
                expected,
                got: pixels.len(),
            });
        }
        let data = if channels == 1 {
            pixels.iter().map(|&v| v as f32).collect()
        } else {
            pixels
                .chunks_exact(channels)
                .map(|px| {
                    LUMA_WEIGHTS[0] * px[0] as f32
                        + LUMA_WEIGHTS[1] * px[1] as f32
                        + LUMA_WEIGHTS[2] * px[2] as f32
                })
                .collect()
        };
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_view(view: &GrayImageView<'_>) -> Result<Self, InvalidInputError> {
        Self::from_gray_u8(view.width, view.height, view.data)
    }

    /// Internal constructor for kernel outputs whose shape is already known to be valid.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert!(width > 0 && height > 0 && data.len() == width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub(crate) fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f32,
    ) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::from_parts(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Sample with edge replication for out-of-range coordinates.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        let xc = x.clamp(0, self.width as isize - 1) as usize;
        let yc = y.clamp(0, self.height as isize - 1) as usize;
        self.data[yc * self.width + xc]
    }

    /// Apply `f` to every sample, producing a new field of the same shape.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Field {
        let data = self.data.iter().map(|&v| f(v)).collect();
        Self::from_parts(self.width, self.height, data)
    }

    /// Combine two equally-shaped fields sample by sample.
    pub fn zip_map(
        &self,
        other: &Field,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Field, InvalidInputError> {
        self.ensure_same_shape(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_parts(self.width, self.height, data))
    }

    pub fn ensure_same_shape(&self, other: &Field) -> Result<(), InvalidInputError> {
        if self.width != other.width || self.height != other.height {
            return Err(InvalidInputError::ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        Ok(())
    }

    /// Round and clamp every sample into the 8-bit range, keeping `f32` storage.
    pub fn quantized(&self) -> Field {
        self.map(|v| v.round().clamp(0.0, 255.0))
    }

    /// Round and clamp into an 8-bit buffer.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Population mean and standard deviation.
    pub fn mean_std(&self) -> (f32, f32) {
        mean_std(&self.data)
    }

    /// Copy out the part of the field covered by `bbox`, clipped to the field.
    ///
    /// Returns `None` when the clipped box is empty.
    pub fn roi(&self, bbox: &BoundingBox) -> Option<Field> {
        let clipped = bbox.clip_to(self.width, self.height)?;
        let (x0, y0) = (clipped.x as usize, clipped.y as usize);
        let (w, h) = (clipped.width as usize, clipped.height as usize);
        let mut data = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            data.extend_from_slice(&self.row(y)[x0..x0 + w]);
        }
        Some(Self::from_parts(w, h, data))
    }
}

pub(crate) fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean as f32, var.sqrt() as f32)
}

/// Bilinear sample with edge replication outside the field.
#[inline]
pub fn sample_bilinear(src: &Field, x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as isize, y0 as isize);

    let p00 = src.get_clamped(x0, y0);
    let p10 = src.get_clamped(x0 + 1, y0);
    let p01 = src.get_clamped(x0, y0 + 1);
    let p11 = src.get_clamped(x0 + 1, y0 + 1);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_zero_sized_and_ragged_input() {
        assert_eq!(
            Field::new(0, 3, Vec::new()),
            Err(InvalidInputError::ZeroSized {
                width: 0,
                height: 3
            })
        );
        assert_eq!(Field::from_rows(&[]), Err(InvalidInputError::Empty));
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            Field::from_rows(&ragged),
            Err(InvalidInputError::NonRectangular {
                row: 1,
                expected: 2,
                got: 1
            })
        );
        assert!(matches!(
            Field::from_gray_u8(2, 2, &[0, 1, 2]),
            Err(InvalidInputError::BufferLength {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn rgb_input_is_converted_to_luma() {
        let px = [255u8, 0, 0, 0, 255, 0, 0, 0, 255];
        let f = Field::from_interleaved_u8(3, 1, 3, &px).expect("valid rgb");
        assert_relative_eq!(f.get(0, 0), 0.2989 * 255.0, epsilon = 1e-3);
        assert_relative_eq!(f.get(1, 0), 0.5870 * 255.0, epsilon = 1e-3);
        assert_relative_eq!(f.get(2, 0), 0.1140 * 255.0, epsilon = 1e-3);
        assert_eq!(
            Field::from_interleaved_u8(1, 1, 2, &[0, 0]),
            Err(InvalidInputError::UnsupportedChannels(2))
        );
    }

    #[test]
    fn roi_is_clipped_to_the_field() {
        let f = Field::from_fn(4, 3, |x, y| (y * 4 + x) as f32);
        let roi = f
            .roi(&BoundingBox::new(2, 1, 10, 10))
            .expect("overlapping roi");
        assert_eq!((roi.width(), roi.height()), (2, 2));
        assert_eq!(roi.data(), &[6.0, 7.0, 10.0, 11.0]);
        assert!(f.roi(&BoundingBox::new(10, 10, 2, 2)).is_none());
    }

    #[test]
    fn bilinear_sampling_replicates_edges() {
        let f = Field::from_rows(&[vec![0.0, 10.0], vec![20.0, 30.0]]).expect("valid");
        assert_relative_eq!(sample_bilinear(&f, 0.5, 0.5), 15.0);
        assert_relative_eq!(sample_bilinear(&f, -3.0, -3.0), 0.0);
        assert_relative_eq!(sample_bilinear(&f, 5.0, 0.0), 10.0);
    }
}
