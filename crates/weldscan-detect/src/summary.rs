//! Whole-image roll-up of a detection run.

use serde::{Deserialize, Serialize};

use crate::types::{DefectClass, Detection};

/// Overall grade of one inspected image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSeverity {
    /// No detections at all.
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub crack: usize,
    pub porosity: usize,
    pub slag: usize,
}

impl ClassCounts {
    pub fn get(&self, class: DefectClass) -> usize {
        match class {
            DefectClass::Crack => self.crack,
            DefectClass::Porosity => self.porosity,
            DefectClass::Slag => self.slag,
        }
    }

    fn bump(&mut self, class: DefectClass) {
        match class {
            DefectClass::Crack => self.crack += 1,
            DefectClass::Porosity => self.porosity += 1,
            DefectClass::Slag => self.slag += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total: usize,
    pub counts: ClassCounts,
    /// Mean boosted confidence; 0 when there are no detections.
    pub average_confidence: f32,
    pub severity: OverallSeverity,
    pub recommendations: Vec<String>,
}

/// Summarize a list of detections.
///
/// Any crack makes the image critical. Otherwise more than 5 detections or a
/// mean confidence above 0.9 is high, more than 2 or above 0.7 is medium.
pub fn summarize(detections: &[Detection]) -> DetectionSummary {
    let mut counts = ClassCounts::default();
    for d in detections {
        counts.bump(d.class());
    }
    let total = detections.len();
    let average_confidence = if total == 0 {
        0.0
    } else {
        detections.iter().map(Detection::confidence).sum::<f32>() / total as f32
    };

    let severity = if total == 0 {
        OverallSeverity::None
    } else if counts.crack > 0 {
        OverallSeverity::Critical
    } else if total > 5 || average_confidence > 0.9 {
        OverallSeverity::High
    } else if total > 2 || average_confidence > 0.7 {
        OverallSeverity::Medium
    } else {
        OverallSeverity::Low
    };

    DetectionSummary {
        total,
        counts,
        average_confidence,
        severity,
        recommendations: summary_recommendations(&counts),
    }
}

fn summary_recommendations(counts: &ClassCounts) -> Vec<String> {
    let mut out = Vec::new();
    if *counts == ClassCounts::default() {
        out.push("No defects detected. Weld quality appears satisfactory.");
    }
    if counts.crack > 0 {
        out.push("Critical: Cracks detected. Immediate repair required.");
        out.push("Review welding parameters and technique.");
    }
    if counts.porosity > 0 {
        out.push("Porosity detected. Check gas shielding and cleanliness.");
        out.push("Consider adjusting welding speed and heat input.");
    }
    if counts.slag > 0 {
        out.push("Slag inclusions found. Improve inter-pass cleaning.");
        out.push("Review welding technique and electrode condition.");
    }
    out.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weldscan_core::BoundingBox;

    use crate::types::{Candidate, RiskLevel, ShapeDescriptors};

    fn det(class: DefectClass, confidence: f32) -> Detection {
        let bbox = BoundingBox::new(0, 0, 4, 4);
        Detection {
            candidate: Candidate::new(class, confidence, bbox, 16.0, ShapeDescriptors::default()),
            quality_score: 0.0,
            confidence_boost: 0.0,
            risk_level: RiskLevel::Low,
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn empty_run_is_satisfactory() {
        let s = summarize(&[]);
        assert_eq!(s.severity, OverallSeverity::None);
        assert_eq!(s.average_confidence, 0.0);
        assert_eq!(
            s.recommendations,
            vec!["No defects detected. Weld quality appears satisfactory.".to_owned()]
        );
    }

    #[test]
    fn any_crack_is_critical() {
        let s = summarize(&[det(DefectClass::Porosity, 0.3), det(DefectClass::Crack, 0.3)]);
        assert_eq!(s.severity, OverallSeverity::Critical);
        assert_eq!(s.counts.get(DefectClass::Crack), 1);
        assert_eq!(s.recommendations.len(), 4);
    }

    #[test]
    fn counts_and_confidence_grade_the_rest() {
        let three: Vec<_> = (0..3).map(|_| det(DefectClass::Slag, 0.5)).collect();
        assert_eq!(summarize(&three).severity, OverallSeverity::Medium);

        let six: Vec<_> = (0..6).map(|_| det(DefectClass::Porosity, 0.5)).collect();
        assert_eq!(summarize(&six).severity, OverallSeverity::High);

        assert_eq!(
            summarize(&[det(DefectClass::Slag, 0.92)]).severity,
            OverallSeverity::High
        );
        assert_eq!(
            summarize(&[det(DefectClass::Slag, 0.75)]).severity,
            OverallSeverity::Medium
        );
        assert_eq!(
            summarize(&[det(DefectClass::Slag, 0.5)]).severity,
            OverallSeverity::Low
        );
    }
}
