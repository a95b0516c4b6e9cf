use serde::{Deserialize, Serialize};
use weldscan_core::kernels::intensity_histogram;
use weldscan_core::Field;

/// Global intensity statistics of an image, reported next to detections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    pub mean_intensity: f32,
    pub std_intensity: f32,
    /// Pixel counts of the rounded intensities `0..=255`.
    pub histogram: Vec<u32>,
}

pub fn extract_features(field: &Field) -> ImageFeatures {
    let (mean_intensity, std_intensity) = field.mean_std();
    ImageFeatures {
        mean_intensity,
        std_intensity,
        histogram: intensity_histogram(field).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_level_field() {
        let f = Field::from_rows(&[vec![10.0, 10.0, 250.0, 250.0]]).expect("valid");
        let feats = extract_features(&f);
        assert_eq!(feats.mean_intensity, 130.0);
        assert_eq!(feats.std_intensity, 120.0);
        assert_eq!(feats.histogram.len(), 256);
        assert_eq!(feats.histogram[10], 2);
        assert_eq!(feats.histogram[250], 2);
        assert_eq!(feats.histogram.iter().sum::<u32>(), 4);
    }
}
