use super::convolve::{convolve, Kernel};
use crate::Field;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Horizontal and vertical Sobel responses.
#[derive(Clone, Debug)]
pub struct SobelGradients {
    pub gx: Field,
    pub gy: Field,
}

impl SobelGradients {
    /// Per-pixel `sqrt(gx^2 + gy^2)`.
    pub fn magnitude(&self) -> Field {
        let data = self
            .gx
            .data()
            .iter()
            .zip(self.gy.data())
            .map(|(&gx, &gy)| (gx * gx + gy * gy).sqrt())
            .collect();
        Field::from_parts(self.gx.width(), self.gx.height(), data)
    }
}

pub fn sobel_gradients(field: &Field) -> SobelGradients {
    SobelGradients {
        gx: convolve(field, &Kernel::from_3x3(SOBEL_X)),
        gy: convolve(field, &Kernel::from_3x3(SOBEL_Y)),
    }
}

pub fn sobel_gradient_magnitude(field: &Field) -> Field {
    sobel_gradients(field).magnitude()
}
