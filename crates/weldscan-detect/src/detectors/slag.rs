use weldscan_core::kernels::{adaptive_threshold, close, Polarity, StructuringElement};
use weldscan_core::region::{describe, trace_contours};
use weldscan_core::Field;

use crate::params::SlagParams;
use crate::types::{cap_confidence, Candidate, DefectClass, ShapeDescriptors};
use crate::DetectError;

/// Irregular, non-elongated regions that stand out from their neighbourhood.
///
/// Candidates must be mid-sized, not elongated, not round and not solid.
/// Confidence grows with irregularity and with the intensity spread inside
/// the bounding box.
pub fn detect_slag(
    field: &Field,
    params: &SlagParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let marked = adaptive_threshold(field, params.block_size, params.offset, Polarity::Dark)?;
    let element = StructuringElement::ellipse(params.close_size, params.close_size)?;
    let closed = close(&marked, &element);

    let mut out = Vec::new();
    for region in trace_contours(&closed) {
        let stats = describe(&region);
        let irregular = stats.area > params.min_area
            && stats.area < params.max_area
            && stats.perimeter > 0.0
            && stats.aspect_ratio < params.max_aspect_ratio
            && stats.circularity < params.max_circularity
            && stats.solidity < params.max_solidity;
        if !irregular {
            continue;
        }
        let (mean, std) = field
            .roi(&stats.bbox)
            .map(|roi| roi.mean_std())
            .unwrap_or_default();
        let confidence = cap_confidence(
            0.2 + (1.0 - stats.circularity) * 0.4
                + (1.0 - stats.solidity) * 0.3
                + (std / 255.0) * 0.1,
        );
        if confidence < confidence_threshold {
            continue;
        }
        let shape = ShapeDescriptors {
            aspect_ratio: Some(stats.aspect_ratio),
            circularity: Some(stats.circularity),
            solidity: Some(stats.solidity),
            perimeter: Some(stats.perimeter),
            mean_intensity: Some(mean),
            std_intensity: Some(std),
            ..ShapeDescriptors::default()
        };
        out.push(Candidate::new(
            DefectClass::Slag,
            confidence,
            stats.bbox,
            stats.area,
            shape,
        ));
    }
    Ok(out)
}
