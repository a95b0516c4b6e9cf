//! Numeric kernels over [`Field`](crate::Field) and [`Mask`](crate::Mask).
//!
//! Every function here is total over a validated field: shapes are checked
//! when a `Field` or `Mask` is built, and only parameter errors (even kernel
//! sizes, non-positive sigmas) surface as [`InvalidInputError`](crate::InvalidInputError).

mod bilateral;
mod canny;
mod convolve;
mod gradient;
mod histogram;
mod median;
mod morphology;
mod resize;
mod threshold;

pub use bilateral::bilateral_filter;
pub use canny::canny;
pub use convolve::{
    convolve, gaussian_blur, gaussian_blur_sigma, gaussian_kernel, gaussian_kernel_sigma,
    laplacian, laplacian_variance, Kernel,
};
pub use gradient::{sobel_gradient_magnitude, sobel_gradients, SobelGradients};
pub use histogram::{clahe, equalize_histogram, intensity_histogram};
pub use median::median_filter;
pub use morphology::{
    close, close_gray, dilate, dilate_gray, erode, erode_gray, open, StructuringElement,
};
pub use resize::{resize_bilinear, resize_to, scaled_dims};
pub use threshold::{adaptive_threshold, binary_threshold, Polarity, INTENSITY_MAX};
