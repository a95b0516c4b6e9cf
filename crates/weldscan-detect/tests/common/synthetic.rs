//! Hand-drawn test images: a flat background with dark or bright shapes.

use weldscan_core::Field;

pub const BACKGROUND: f32 = 200.0;
pub const DARK: f32 = 40.0;

/// Row-major canvas that shapes are painted onto in call order.
pub struct Canvas {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: f32) -> Self {
        Self {
            width,
            height,
            data: vec![background; width * height],
        }
    }

    fn paint(mut self, value: f32, inside: impl Fn(usize, usize) -> bool) -> Self {
        for y in 0..self.height {
            for x in 0..self.width {
                if inside(x, y) {
                    self.data[y * self.width + x] = value;
                }
            }
        }
        self
    }

    /// Axis-aligned filled rectangle with top-left corner `(x0, y0)`.
    pub fn rect(self, x0: usize, y0: usize, w: usize, h: usize, value: f32) -> Self {
        self.paint(value, |x, y| {
            (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y)
        })
    }

    /// Vertical segment `thickness` pixels wide.
    pub fn vertical_line(self, x0: usize, y0: usize, len: usize, thickness: usize) -> Self {
        self.rect(x0, y0, thickness, len, DARK)
    }

    /// Filled disk of pixels whose centers lie within `r` of `(cx, cy)`.
    pub fn disk(self, cx: f32, cy: f32, r: f32, value: f32) -> Self {
        self.paint(value, |x, y| {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            dx * dx + dy * dy <= r * r
        })
    }

    pub fn build(self) -> Field {
        Field::new(self.width, self.height, self.data).expect("canvas is non-empty")
    }
}

pub fn uniform(width: usize, height: usize, value: f32) -> Field {
    Canvas::new(width, height, value).build()
}

/// 120x120 background with one 2x60 dark vertical line at `(50, 30)`.
pub fn crack_scene() -> Field {
    Canvas::new(120, 120, BACKGROUND)
        .vertical_line(50, 30, 60, 2)
        .build()
}

/// Centers and radii of the pores drawn by [`pore_scene`].
pub const PORES: [(f32, f32, f32); 3] = [
    (45.0, 45.0, 10.0),
    (135.0, 45.0, 11.0),
    (90.0, 130.0, 12.0),
];

/// 180x180 background with three well separated dark disks.
pub fn pore_scene() -> Field {
    PORES
        .iter()
        .fold(Canvas::new(180, 180, BACKGROUND), |canvas, &(cx, cy, r)| {
            canvas.disk(cx, cy, r, DARK)
        })
        .build()
}
