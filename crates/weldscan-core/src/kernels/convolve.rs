//! Dense 2-D correlation with edge replication, plus the Gaussian and
//! Laplacian kernels built on top of it.

use crate::{Field, InvalidInputError};

/// Odd-sized dense weight matrix, row-major, anchored at its center.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<f32>,
}

impl Kernel {
    pub fn new(
        width: usize,
        height: usize,
        weights: Vec<f32>,
    ) -> Result<Self, InvalidInputError> {
        if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
            return Err(InvalidInputError::InvalidKernel { width, height });
        }
        if weights.len() != width * height {
            return Err(InvalidInputError::BufferLength {
                expected: width * height,
                got: weights.len(),
            });
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// 3x3 kernel from a literal matrix.
    pub fn from_3x3(rows: [[f32; 3]; 3]) -> Self {
        Self {
            width: 3,
            height: 3,
            weights: rows.iter().flatten().copied().collect(),
        }
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
    pub fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.width + kx]
    }

    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

const LAPLACIAN_3X3: [[f32; 3]; 3] =
    [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Weighted sum of the kernel window at every pixel.
///
/// Borders are padded by repeating the outermost samples (`pad = size / 2`);
/// the output has the input's dimensions. The kernel is applied as-is
/// (correlation, no flip) and no normalization is added.
pub fn convolve(field: &Field, kernel: &Kernel) -> Field {
    let (w, h) = (field.width(), field.height());
    let pad_x = (kernel.width / 2) as isize;
    let pad_y = (kernel.height / 2) as isize;

    // Clamped column index for every (x, kx) pair, computed once.
    let col_idx: Vec<usize> = (0..w as isize)
        .flat_map(|x| {
            (0..kernel.width as isize)
                .map(move |kx| (x + kx - pad_x).clamp(0, w as isize - 1) as usize)
        })
        .collect();

    let mut out = Vec::with_capacity(w * h);
    for y in 0..h as isize {
        for x in 0..w {
            let cols = &col_idx[x * kernel.width..(x + 1) * kernel.width];
            let mut acc = 0.0f32;
            for ky in 0..kernel.height {
                let sy = (y + ky as isize - pad_y).clamp(0, h as isize - 1) as usize;
                let row = field.row(sy);
                let krow = &kernel.weights[ky * kernel.width..(ky + 1) * kernel.width];
                for (kw, &sx) in krow.iter().zip(cols) {
                    acc += kw * row[sx];
                }
            }
            out.push(acc);
        }
    }
    Field::from_parts(w, h, out)
}

/// Square Gaussian kernel with `sigma = size / 3`, normalized to sum 1.
pub fn gaussian_kernel(size: usize) -> Result<Kernel, InvalidInputError> {
    gaussian_kernel_sigma(size, size as f32 / 3.0)
}

/// Square Gaussian kernel with an explicit sigma, normalized to sum 1.
///
/// `size == 0` derives the size from sigma as `2 * ceil(3 * sigma) + 1`.
pub fn gaussian_kernel_sigma(size: usize, sigma: f32) -> Result<Kernel, InvalidInputError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(InvalidInputError::InvalidParameter {
            name: "sigma",
            value: sigma as f64,
        });
    }
    let size = if size == 0 {
        2 * (3.0 * sigma).ceil() as usize + 1
    } else {
        size
    };
    if size % 2 == 0 {
        return Err(InvalidInputError::InvalidKernel {
            width: size,
            height: size,
        });
    }
    let center = (size / 2) as f32;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let dx = i as f32 - center;
            let dy = j as f32 - center;
            weights.push((-(dx * dx + dy * dy) / two_sigma2).exp());
        }
    }
    let total: f32 = weights.iter().sum();
    for v in &mut weights {
        *v /= total;
    }
    Kernel::new(size, size, weights)
}

pub fn gaussian_blur(field: &Field, size: usize) -> Result<Field, InvalidInputError> {
    Ok(convolve(field, &gaussian_kernel(size)?))
}

pub fn gaussian_blur_sigma(
    field: &Field,
    size: usize,
    sigma: f32,
) -> Result<Field, InvalidInputError> {
    Ok(convolve(field, &gaussian_kernel_sigma(size, sigma)?))
}

/// 4-neighbour Laplacian (`[0,1,0; 1,-4,1; 0,1,0]`).
pub fn laplacian(field: &Field) -> Field {
    convolve(field, &Kernel::from_3x3(LAPLACIAN_3X3))
}

/// Population variance of the Laplacian response, a simple sharpness measure.
pub fn laplacian_variance(field: &Field) -> f32 {
    let (_, std) = laplacian(field).mean_std();
    std * std
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(w: usize, h: usize) -> Field {
        Field::from_fn(w, h, |x, y| (x + 10 * y) as f32)
    }

    #[test]
    fn identity_kernel_preserves_field() {
        let f = ramp(5, 4);
        let k = Kernel::from_3x3([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        assert_eq!(convolve(&f, &k), f);
    }

    #[test]
    fn border_samples_are_replicated() {
        let f = Field::from_rows(&[vec![1.0, 2.0, 3.0]]).expect("valid");
        // Sums the left neighbour only.
        let k = Kernel::from_3x3([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        assert_eq!(convolve(&f, &k).data(), &[1.0, 1.0, 2.0]);
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(5).expect("odd size");
        assert_relative_eq!(k.sum(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(k.weight(0, 0), k.weight(4, 4));
        assert_relative_eq!(k.weight(1, 2), k.weight(2, 1));
        assert!(k.weight(2, 2) > k.weight(1, 2));
        assert!(gaussian_kernel(4).is_err());
        assert_eq!(gaussian_kernel_sigma(0, 2.0).expect("derived").width(), 13);
    }

    #[test]
    fn blur_keeps_constant_field() {
        let f = Field::filled(7, 6, 42.0).expect("valid");
        let out = gaussian_blur(&f, 5).expect("valid kernel");
        for &v in out.data() {
            assert_relative_eq!(v, 42.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn laplacian_of_linear_ramp_vanishes_inside() {
        let f = ramp(6, 6);
        let lap = laplacian(&f);
        for y in 1..5 {
            for x in 1..5 {
                assert_relative_eq!(lap.get(x, y), 0.0);
            }
        }
    }
}
