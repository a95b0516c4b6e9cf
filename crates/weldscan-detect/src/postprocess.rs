//! Turning surviving candidates into scored, graded [`Detection`]s.
//!
//! Each candidate's box is clipped to the image and the enclosed part of the
//! enhanced field is scored for contrast and sharpness. That quality score
//! nudges the confidence upward (never past [`MAX_CONFIDENCE`]), the boosted
//! confidence and the detector's severity decide the risk level, and the
//! risk level selects guidance text.

use log::debug;
#[cfg(feature = "tracing")]
use tracing::instrument;
use weldscan_core::kernels::laplacian_variance;
use weldscan_core::Field;

use crate::params::PostProcessParams;
use crate::types::{Candidate, Detection, RiskLevel, Severity, MAX_CONFIDENCE};

/// Contrast/sharpness score of a region in `[0, 1]`.
///
/// `0.6 * min(1, (std / mean) / 50) + 0.4 * min(1, var(laplacian) / 1000)`
/// with the default weights and scales.
pub fn quality_score(roi: &Field, params: &PostProcessParams) -> f32 {
    let (mean, std) = roi.mean_std();
    let contrast = std / (mean + 1e-6);
    let contrast_score = (contrast / params.contrast_scale).min(1.0);
    let sharpness_score = (laplacian_variance(roi) / params.sharpness_scale).min(1.0);
    params.contrast_weight * contrast_score + params.sharpness_weight * sharpness_score
}

/// Grade a detection from its (boosted) confidence and detector severity.
pub fn risk_level(confidence: f32, severity: Severity) -> RiskLevel {
    if confidence > 0.8 && severity == Severity::High {
        RiskLevel::Critical
    } else if confidence > 0.6 && matches!(severity, Severity::High | Severity::Medium) {
        RiskLevel::High
    } else if confidence > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Score, grade and annotate every candidate.
///
/// The result is sorted by descending boosted confidence; ties keep input
/// order.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(candidates, enhanced, params),
        fields(candidates = candidates.len())
    )
)]
pub fn post_process(
    candidates: Vec<Candidate>,
    enhanced: &Field,
    params: &PostProcessParams,
) -> Vec<Detection> {
    let mut out: Vec<Detection> = candidates
        .into_iter()
        .map(|candidate| annotate(candidate, enhanced, params))
        .collect();
    out.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
    debug!("post-processed {} detections", out.len());
    out
}

fn annotate(mut candidate: Candidate, enhanced: &Field, params: &PostProcessParams) -> Detection {
    let clipped = candidate.bbox.clip_to(enhanced.width(), enhanced.height());
    let quality = match clipped {
        Some(bbox) => {
            candidate.bbox = bbox;
            enhanced
                .roi(&bbox)
                .map_or(0.0, |roi| quality_score(&roi, params))
        }
        None => 0.0,
    };

    let original = candidate.confidence;
    let boosted = (original * (1.0 + quality * params.boost_gain)).min(MAX_CONFIDENCE);
    candidate.confidence = boosted;

    let risk = risk_level(boosted, candidate.severity);
    let recommendations = params
        .recommendations
        .lookup(candidate.class, risk)
        .to_vec();
    Detection {
        candidate,
        quality_score: quality,
        confidence_boost: boosted - original,
        risk_level: risk,
        recommendations,
    }
}
