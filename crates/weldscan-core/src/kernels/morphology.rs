//! Binary dilation, erosion, opening and closing.
//!
//! Dilation treats everything outside the mask as background. Erosion only
//! looks at neighbours that fall inside the mask, so a foreground pixel on the
//! border is not eroded just because the element pokes outside. With both rules
//! `close(m)` always contains `m` and `open(m)` is always contained in `m`.
//! The grayscale variants (max/min filters) follow the same border rule.

use crate::{Field, InvalidInputError, Mask};

/// Set of offsets around an anchor at the element's center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    fn from_predicate(
        width: usize,
        height: usize,
        mut member: impl FnMut(usize, usize) -> bool,
    ) -> Result<Self, InvalidInputError> {
        if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
            return Err(InvalidInputError::InvalidKernel { width, height });
        }
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        let mut offsets = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if member(x, y) {
                    offsets.push((x as i32 - cx, y as i32 - cy));
                }
            }
        }
        Ok(Self {
            width,
            height,
            offsets,
        })
    }

    /// Full `width x height` rectangle.
    pub fn rect(width: usize, height: usize) -> Result<Self, InvalidInputError> {
        Self::from_predicate(width, height, |_, _| true)
    }

    /// Ellipse inscribed in a `width x height` box.
    ///
    /// Rows are filled symmetrically around the center column with half-width
    /// `round(cx * sqrt(1 - dy^2 / r^2))`, so the 3x3 ellipse is a cross and the
    /// 5x5 ellipse drops the corners of its first and last rows.
    pub fn ellipse(width: usize, height: usize) -> Result<Self, InvalidInputError> {
        let r = (height / 2) as f32;
        let c = (width / 2) as f32;
        let inv_r2 = if r > 0.0 { 1.0 / (r * r) } else { 0.0 };
        Self::from_predicate(width, height, |x, y| {
            let dy = y as f32 - r;
            let dx = (c * ((r * r - dy * dy) * inv_r2).max(0.0).sqrt()).round();
            let x = x as f32;
            x >= c - dx && x <= c + dx
        })
    }

    /// Vertical line one pixel wide and `length` pixels tall.
    pub fn vertical_line(length: usize) -> Result<Self, InvalidInputError> {
        Self::rect(1, length)
    }

    /// Plus shape: center row and center column of a `size x size` box.
    pub fn cross(size: usize) -> Result<Self, InvalidInputError> {
        let mid = size / 2;
        Self::from_predicate(size, size, |x, y| x == mid || y == mid)
    }

    /// Element from an explicit odd-sized mask.
    pub fn from_mask(mask: &Mask) -> Result<Self, InvalidInputError> {
        Self::from_predicate(mask.width(), mask.height(), |x, y| mask.get(x, y))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Offsets of the member cells relative to the anchor.
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.offsets.contains(&(dx, dy))
    }
}

/// Foreground wherever the element centered on the pixel hits any foreground.
pub fn dilate(mask: &Mask, element: &StructuringElement) -> Mask {
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        element
            .offsets
            .iter()
            .any(|&(dx, dy)| mask.get_or_background(x - dx, y - dy))
    })
}

/// Foreground where every in-bounds element position is foreground.
pub fn erode(mask: &Mask, element: &StructuringElement) -> Mask {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        element.offsets.iter().all(|&(dx, dy)| {
            let (sx, sy) = (x + dx, y + dy);
            sx < 0 || sy < 0 || sx >= w || sy >= h || mask.get(sx as usize, sy as usize)
        })
    })
}

/// Dilation followed by erosion; bridges gaps narrower than the element.
pub fn close(mask: &Mask, element: &StructuringElement) -> Mask {
    erode(&dilate(mask, element), element)
}

/// Erosion followed by dilation; drops specks smaller than the element.
pub fn open(mask: &Mask, element: &StructuringElement) -> Mask {
    dilate(&erode(mask, element), element)
}

/// Grayscale dilation: maximum over the in-bounds element positions.
pub fn dilate_gray(field: &Field, element: &StructuringElement) -> Field {
    extremum_filter(field, element, -1, f32::max)
}

/// Grayscale erosion: minimum over the in-bounds element positions.
pub fn erode_gray(field: &Field, element: &StructuringElement) -> Field {
    extremum_filter(field, element, 1, f32::min)
}

/// Grayscale closing; fills dark gaps narrower than the element.
pub fn close_gray(field: &Field, element: &StructuringElement) -> Field {
    erode_gray(&dilate_gray(field, element), element)
}

fn extremum_filter(
    field: &Field,
    element: &StructuringElement,
    sign: i32,
    pick: fn(f32, f32) -> f32,
) -> Field {
    let (w, h) = (field.width() as i32, field.height() as i32);
    Field::from_fn(field.width(), field.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        let center = field.get(x as usize, y as usize);
        element.offsets.iter().fold(center, |acc, &(dx, dy)| {
            let (sx, sy) = (x + sign * dx, y + sign * dy);
            if sx < 0 || sy < 0 || sx >= w || sy >= h {
                acc
            } else {
                pick(acc, field.get(sx as usize, sy as usize))
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let w = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| b == b'#'))
            .collect();
        Mask::from_vec(w, rows.len(), data).expect("rectangular")
    }

    #[test]
    fn ellipse_shapes_follow_the_row_half_width_rule() {
        let e3 = StructuringElement::ellipse(3, 3).expect("odd");
        assert_eq!(e3, StructuringElement::cross(3).expect("odd"));

        let e5 = StructuringElement::ellipse(5, 5).expect("odd");
        assert_eq!(e5.offsets().len(), 5 * 5 - 4 * 2);
        assert!(!e5.contains(-1, -2));
        assert!(e5.contains(0, -2));
        assert!(e5.contains(-2, -1));
    }

    #[test]
    fn vertical_line_is_one_pixel_wide() {
        let v = StructuringElement::vertical_line(7).expect("odd");
        assert_eq!((v.width(), v.height()), (1, 7));
        assert!(v.offsets().iter().all(|&(dx, _)| dx == 0));
        assert!(StructuringElement::vertical_line(6).is_err());
    }

    #[test]
    fn closing_bridges_a_vertical_gap() {
        let m = mask_from_rows(&[".....", "..#..", ".....", ".....", "..#..", "....."]);
        let closed = close(&m, &StructuringElement::vertical_line(5).expect("odd"));
        for y in 1..=4 {
            assert!(closed.get(2, y), "row {y} should be filled");
        }
        assert!(!closed.get(1, 2));
    }

    #[test]
    fn opening_removes_specks_but_keeps_blobs() {
        let m = mask_from_rows(&[
            "#.......", "........", "...###..", "...###..", "...###..", "........",
        ]);
        let opened = open(&m, &StructuringElement::rect(3, 3).expect("odd"));
        assert!(!opened.get(0, 0));
        assert_eq!(opened.count(), 9);
    }

    #[test]
    fn grayscale_close_fills_a_narrow_dark_gap() {
        let f = Field::from_rows(&[vec![200.0, 200.0, 20.0, 200.0, 200.0]]).expect("valid");
        let closed = close_gray(&f, &StructuringElement::rect(3, 1).expect("odd"));
        assert!(closed.data().iter().all(|&v| v == 200.0));
        let dilated = dilate_gray(&f, &StructuringElement::rect(3, 1).expect("odd"));
        assert_eq!(erode_gray(&dilated, &StructuringElement::rect(3, 1).expect("odd")), closed);
    }

    #[test]
    fn closing_is_extensive_at_the_border() {
        let m = mask_from_rows(&["##...", "##...", "....."]);
        let closed = close(&m, &StructuringElement::ellipse(5, 5).expect("odd"));
        for p in m.foreground() {
            assert!(closed.get(p.x as usize, p.y as usize));
        }
        let opened = open(&m, &StructuringElement::rect(3, 3).expect("odd"));
        for p in opened.foreground() {
            assert!(m.get(p.x as usize, p.y as usize));
        }
    }
}
