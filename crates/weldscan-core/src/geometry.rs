use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate.
pub type PixelPoint = Point2<i32>;

/// Axis-aligned integer box, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight inclusive box around a set of pixels (`width = max_x - min_x + 1`).
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Integer center, `(x + w/2, y + h/2)`.
    pub fn center(&self) -> PixelPoint {
        Point2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// `max(w, h) / max(min(w, h), 1)`.
    pub fn aspect_ratio(&self) -> f32 {
        let long = self.width.max(self.height) as f32;
        let short = self.width.min(self.height).max(1) as f32;
        long / short
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> i64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return 0;
        }
        (x2 - x1) as i64 * (y2 - y1) as i64
    }

    /// Intersection over union; 0 for disjoint boxes or a zero union.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        if union <= 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }

    /// Intersect with `[0, width) x [0, height)`; `None` when nothing is left.
    pub fn clip_to(&self, width: usize, height: usize) -> Option<BoundingBox> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(width as i32);
        let y1 = self.bottom().min(height as i32);
        (x1 > x0 && y1 > y0).then(|| BoundingBox::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Multiply every coordinate by `factor`, rounding to the nearest pixel.
    ///
    /// Width and height never drop below 1.
    pub fn scaled(&self, factor: f32) -> BoundingBox {
        let s = |v: i32| (v as f32 * factor).round() as i32;
        BoundingBox::new(s(self.x), s(self.y), s(self.width).max(1), s(self.height).max(1))
    }
}
