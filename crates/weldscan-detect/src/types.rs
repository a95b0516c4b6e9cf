use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weldscan_core::{BoundingBox, PixelPoint};

/// Upper bound of every confidence produced by the pipeline.
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Clamp a raw confidence formula into `[0, MAX_CONFIDENCE]`.
#[inline]
pub(crate) fn cap_confidence(raw: f32) -> f32 {
    raw.clamp(0.0, MAX_CONFIDENCE)
}

/// Weld defect class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectClass {
    Crack,
    Porosity,
    #[serde(alias = "slag_inclusion")]
    Slag,
}

impl DefectClass {
    pub const ALL: [DefectClass; 3] = [
        DefectClass::Crack,
        DefectClass::Porosity,
        DefectClass::Slag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DefectClass::Crack => "crack",
            DefectClass::Porosity => "porosity",
            DefectClass::Slag => "slag",
        }
    }
}

impl fmt::Display for DefectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-candidate severity derived from its detector confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// `> 0.8` high, `> 0.6` medium, otherwise low.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence > 0.8 {
            Severity::High
        } else if confidence > 0.6 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Ordered risk grade attached during post-processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Error returned when parsing an unknown enum name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Preprocessing profile applied before detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementMode {
    /// Global histogram equalization, then a 5x5 Gaussian blur.
    Standard,
    /// CLAHE, unsharp mask, bilateral smoothing and a 3x3 elliptical close.
    #[default]
    Advanced,
    /// Weighted blend of CLAHE, |Laplacian| and normalized gradient layers.
    HighSensitivity,
}

impl EnhancementMode {
    pub const ALL: [EnhancementMode; 3] = [
        EnhancementMode::Standard,
        EnhancementMode::Advanced,
        EnhancementMode::HighSensitivity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnhancementMode::Standard => "standard",
            EnhancementMode::Advanced => "advanced",
            EnhancementMode::HighSensitivity => "high_sensitivity",
        }
    }
}

impl fmt::Display for EnhancementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementMode {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(EnhancementMode::Standard),
            "advanced" => Ok(EnhancementMode::Advanced),
            "high_sensitivity" => Ok(EnhancementMode::HighSensitivity),
            _ => Err(ParseNameError {
                kind: "enhancement mode",
                value: s.to_owned(),
                expected: "standard, advanced, high_sensitivity",
            }),
        }
    }
}

/// Which generation of detectors to run.
///
/// `Enhanced` is the canonical multi-scale pipeline. `Simple` keeps the older
/// heuristics (raw grayscale, single scale, different confidence formulas) so
/// results from either generation stay reproducible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorStrategy {
    Simple,
    #[default]
    Enhanced,
}

impl DetectorStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectorStrategy::Simple => "simple",
            DetectorStrategy::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for DetectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorStrategy {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(DetectorStrategy::Simple),
            "enhanced" => Ok(DetectorStrategy::Enhanced),
            _ => Err(ParseNameError {
                kind: "detector strategy",
                value: s.to_owned(),
                expected: "simple, enhanced",
            }),
        }
    }
}

/// Configuration threaded through one detection pass at one scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleContext {
    pub scale_factor: f32,
    pub enhancement_mode: EnhancementMode,
    pub confidence_threshold: f32,
}

/// Class-dependent shape and intensity descriptors; absent ones are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeDescriptors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circularity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solidity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irregularity: Option<f32>,
    /// Sampling radius of the circle-sampling porosity detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_intensity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_intensity: Option<f32>,
}

/// Raw detector output, in the coordinates of the field it was found in
/// until [`Candidate::rescaled`] maps it back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub class: DefectClass,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub center: PixelPoint,
    pub area: f32,
    #[serde(flatten)]
    pub shape: ShapeDescriptors,
    pub severity: Severity,
    /// Scale factor of the pass that produced the candidate.
    pub scale: f32,
}

impl Candidate {
    /// Candidate found at scale 1 with center and severity derived from
    /// `bbox` and `confidence`.
    pub fn new(
        class: DefectClass,
        confidence: f32,
        bbox: BoundingBox,
        area: f32,
        shape: ShapeDescriptors,
    ) -> Self {
        Self {
            class,
            confidence,
            bbox,
            center: bbox.center(),
            area,
            shape,
            severity: Severity::from_confidence(confidence),
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Map geometry by `factor` (use `1 / scale` to return to the original
    /// image). Positions and sizes are rounded, area scales by `factor^2`,
    /// lengths by `factor`; dimensionless descriptors are untouched.
    pub fn rescaled(&self, factor: f32) -> Candidate {
        let round = |v: i32| (v as f32 * factor).round() as i32;
        let mut out = self.clone();
        out.bbox = self.bbox.scaled(factor);
        out.center = PixelPoint::new(round(self.center.x), round(self.center.y));
        out.area = self.area * factor * factor;
        out.shape.perimeter = self.shape.perimeter.map(|p| p * factor);
        out.shape.radius = self.shape.radius.map(|r| r * factor);
        out
    }
}

/// Post-processed detection returned to callers.
///
/// `candidate.confidence` holds the quality-boosted confidence;
/// `confidence_boost` is how much was added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub quality_score: f32,
    pub confidence_boost: f32,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

impl Detection {
    #[inline]
    pub fn class(&self) -> DefectClass {
        self.candidate.class
    }

    #[inline]
    pub fn confidence(&self) -> f32 {
        self.candidate.confidence
    }

    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.candidate.bbox
    }
}
