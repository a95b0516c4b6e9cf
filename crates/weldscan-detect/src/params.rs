//! Tunable parameters for every pipeline stage.
//!
//! Defaults carry the canonical constants; every struct is `#[serde(default)]`
//! so a JSON config only needs the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::recommend::RecommendationTable;
use crate::types::DetectorStrategy;

/// Enhancement profile settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    /// Gaussian size after equalization in the `standard` profile.
    pub standard_blur_size: usize,

    pub advanced_clip_limit: f32,
    pub advanced_tiles: (usize, usize),
    /// Sigma of the blur subtracted by the unsharp mask.
    pub unsharp_sigma: f32,
    /// `out = amount * x - (amount - 1) * blur(x)`.
    pub unsharp_amount: f32,
    pub bilateral_diameter: usize,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Elliptical element size of the final grayscale close.
    pub advanced_close_size: usize,

    pub sensitive_clip_limit: f32,
    pub sensitive_tiles: (usize, usize),
    /// Weights of the CLAHE, |Laplacian| and gradient layers.
    pub sensitive_weights: [f32; 3],
    pub sensitive_blur_size: usize,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            standard_blur_size: 5,
            advanced_clip_limit: 3.0,
            advanced_tiles: (8, 8),
            unsharp_sigma: 2.0,
            unsharp_amount: 1.5,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            advanced_close_size: 3,
            sensitive_clip_limit: 2.0,
            sensitive_tiles: (4, 4),
            sensitive_weights: [0.5, 0.3, 0.2],
            sensitive_blur_size: 3,
        }
    }
}

/// Edge-based crack detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackParams {
    /// Canny `(low, high)` pairs whose edge maps are OR-ed together.
    pub canny_thresholds: Vec<(f32, f32)>,
    /// Height of the vertical closing element that joins broken edges.
    pub close_length: usize,
    pub min_area: f32,
    pub min_aspect_ratio: f32,
}

impl Default for CrackParams {
    fn default() -> Self {
        Self {
            canny_thresholds: vec![(50.0, 150.0), (100.0, 200.0), (30.0, 100.0)],
            close_length: 7,
            min_area: 100.0,
            min_aspect_ratio: 3.0,
        }
    }
}

/// Multi-level dark blob detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PorosityParams {
    pub blur_size: usize,
    /// Normalized darkness levels; each produces its own candidates.
    pub dark_levels: Vec<f32>,
    pub open_size: usize,
    pub min_area: f32,
    pub max_area: f32,
    pub min_circularity: f32,
}

impl Default for PorosityParams {
    fn default() -> Self {
        Self {
            blur_size: 5,
            dark_levels: vec![0.3, 0.5, 0.7],
            open_size: 3,
            min_area: 20.0,
            max_area: 500.0,
            min_circularity: 0.4,
        }
    }
}

/// Adaptive-threshold slag inclusion detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlagParams {
    pub block_size: usize,
    pub offset: f32,
    pub close_size: usize,
    pub min_area: f32,
    pub max_area: f32,
    pub max_aspect_ratio: f32,
    pub max_circularity: f32,
    pub max_solidity: f32,
}

impl Default for SlagParams {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
            close_size: 5,
            min_area: 100.0,
            max_area: 2000.0,
            max_aspect_ratio: 3.0,
            max_circularity: 0.7,
            max_solidity: 0.8,
        }
    }
}

/// Settings of the single-scale [`DetectorStrategy::Simple`] detectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleParams {
    pub crack_blur_size: usize,
    /// Sobel magnitudes above this count as edge pixels.
    pub gradient_floor: f32,
    pub crack_close_length: usize,
    pub crack_min_area: f32,
    pub crack_min_aspect_ratio: f32,

    pub median_size: usize,
    pub dark_threshold: f32,
    /// Spacing of candidate circle centers for the circle search.
    pub grid_step: usize,
    pub min_radius: usize,
    /// Exclusive upper bound of candidate radii; also the border margin.
    pub max_radius: usize,
    pub radius_step: usize,
    /// Fraction of the 24 ring samples that must be dark.
    pub ring_fill_ratio: f32,

    pub bright_threshold: f32,
    pub min_region_pixels: usize,
    pub slag_min_area: f32,
    pub min_irregularity: f32,
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            crack_blur_size: 3,
            gradient_floor: 1e-3,
            crack_close_length: 7,
            crack_min_area: 100.0,
            crack_min_aspect_ratio: 3.0,
            median_size: 5,
            dark_threshold: 0.4,
            grid_step: 10,
            min_radius: 5,
            max_radius: 50,
            radius_step: 5,
            ring_fill_ratio: 0.6,
            bright_threshold: 0.7,
            min_region_pixels: 10,
            slag_min_area: 50.0,
            min_irregularity: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsParams {
    /// Candidates overlapping a kept one by at least this IoU are dropped.
    pub iou_threshold: f32,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self { iou_threshold: 0.4 }
    }
}

/// Quality scoring, confidence boosting and guidance text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessParams {
    /// `contrast_score = min(1, (std / mean) / contrast_scale)`.
    pub contrast_scale: f32,
    /// `sharpness_score = min(1, laplacian_variance / sharpness_scale)`.
    pub sharpness_scale: f32,
    pub contrast_weight: f32,
    pub sharpness_weight: f32,
    /// `boosted = min(0.95, confidence * (1 + quality * boost_gain))`.
    pub boost_gain: f32,
    pub recommendations: RecommendationTable,
}

impl Default for PostProcessParams {
    fn default() -> Self {
        Self {
            contrast_scale: 50.0,
            sharpness_scale: 1000.0,
            contrast_weight: 0.6,
            sharpness_weight: 0.4,
            boost_gain: 0.2,
            recommendations: RecommendationTable::default(),
        }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub strategy: DetectorStrategy,
    /// Resize factors of the multi-scale pass, in aggregation order.
    pub scales: Vec<f32>,
    pub enhance: EnhanceParams,
    pub crack: CrackParams,
    pub porosity: PorosityParams,
    pub slag: SlagParams,
    pub simple: SimpleParams,
    pub nms: NmsParams,
    pub post: PostProcessParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            strategy: DetectorStrategy::Enhanced,
            scales: vec![1.0, 1.5, 0.7],
            enhance: EnhanceParams::default(),
            crack: CrackParams::default(),
            porosity: PorosityParams::default(),
            slag: SlagParams::default(),
            simple: SimpleParams::default(),
            nms: NmsParams::default(),
            post: PostProcessParams::default(),
        }
    }
}

impl DetectorParams {
    /// Defaults for the older single-scale detector generation.
    pub fn simple() -> Self {
        Self {
            strategy: DetectorStrategy::Simple,
            scales: vec![1.0],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: DetectorParams =
            serde_json::from_str(r#"{ "scales": [1.0], "nms": { "iou_threshold": 0.5 } }"#)
                .expect("valid json");
        assert_eq!(params.scales, vec![1.0]);
        assert_eq!(params.nms.iou_threshold, 0.5);
        assert_eq!(params.crack, CrackParams::default());
        assert_eq!(params.strategy, DetectorStrategy::Enhanced);
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = DetectorParams::simple();
        let json = serde_json::to_string(&params).expect("serialize");
        let back: DetectorParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, params);
    }
}
