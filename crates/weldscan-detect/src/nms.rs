//! Class-aware greedy non-maximum suppression.

use log::debug;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::types::{Candidate, DefectClass};

/// Drop candidates that overlap a more confident candidate of the same class.
///
/// Within each class candidates are visited by descending confidence (ties
/// keep input order); a candidate is kept unless its IoU with an already
/// kept one is `>= iou_threshold`. Classes never suppress each other. The
/// output lists the kept candidates class by class, most confident first.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(candidates), fields(candidates = candidates.len()))
)]
pub fn suppress(candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    let total = candidates.len();
    let mut out = Vec::with_capacity(total);
    for class in DefectClass::ALL {
        let mut group: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.class == class)
            .cloned()
            .collect();
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let first_kept = out.len();
        for candidate in group {
            let overlaps = out[first_kept..]
                .iter()
                .any(|kept: &Candidate| kept.bbox.iou(&candidate.bbox) >= iou_threshold);
            if !overlaps {
                out.push(candidate);
            }
        }
    }
    debug!("nms kept {} of {total} candidates", out.len());
    out
}
