use crate::geometry::PixelPoint;
use crate::{Field, InvalidInputError};

/// Binary foreground/background grid with the same shape rules as [`Field`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl Mask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidInputError> {
        if width == 0 || height == 0 {
            return Err(InvalidInputError::ZeroSized { width, height });
        }
        Ok(Self::empty_like_dims(width, height))
    }

    pub fn from_vec(
        width: usize,
        height: usize,
        data: Vec<bool>,
    ) -> Result<Self, InvalidInputError> {
        let mut mask = Self::new(width, height)?;
        if data.len() != width * height {
            return Err(InvalidInputError::BufferLength {
                expected: width * height,
                got: data.len(),
            });
        }
        mask.data = data;
        Ok(mask)
    }

    pub(crate) fn empty_like_dims(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    /// Background mask with the same shape as `field`.
    pub fn empty_like(field: &Field) -> Self {
        Self::empty_like_dims(field.width(), field.height())
    }

    pub(crate) fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
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
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Signed lookup; anything outside the mask is background.
    #[inline]
    pub fn get_or_background(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.data[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.data[y * self.width + x] = value;
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// In-place union with an equally-shaped mask.
    pub fn union_with(&mut self, other: &Mask) -> Result<(), InvalidInputError> {
        if self.width != other.width || self.height != other.height {
            return Err(InvalidInputError::ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a |= b;
        }
        Ok(())
    }

    pub fn foreground(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| PixelPoint::new((i % self.width) as i32, (i / self.width) as i32))
    }
}
