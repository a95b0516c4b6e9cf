use weldscan_core::kernels::{canny, close, StructuringElement};
use weldscan_core::region::{describe, trace_contours};
use weldscan_core::{Field, Mask};

use crate::params::CrackParams;
use crate::types::{cap_confidence, Candidate, DefectClass, ShapeDescriptors};
use crate::DetectError;

/// Long thin regions of joined Canny edges.
///
/// Edge maps from every threshold pair are OR-ed, gaps are bridged with a
/// vertical closing, and each 8-connected component with `area > min_area`
/// and `aspect > min_aspect_ratio` scores
/// `min(0.95, 0.4 + (aspect - 3) * 0.1 + solidity * 0.3)`.
pub fn detect_cracks(
    field: &Field,
    params: &CrackParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let mut edges = Mask::empty_like(field);
    for &(low, high) in &params.canny_thresholds {
        edges.union_with(&canny(field, low, high)?)?;
    }
    let joined = close(&edges, &StructuringElement::vertical_line(params.close_length)?);

    let mut out = Vec::new();
    for region in trace_contours(&joined) {
        let stats = describe(&region);
        if stats.area <= params.min_area || stats.aspect_ratio <= params.min_aspect_ratio {
            continue;
        }
        let confidence =
            cap_confidence(0.4 + (stats.aspect_ratio - 3.0) * 0.1 + stats.solidity * 0.3);
        if confidence < confidence_threshold {
            continue;
        }
        let shape = ShapeDescriptors {
            aspect_ratio: Some(stats.aspect_ratio),
            solidity: Some(stats.solidity),
            perimeter: Some(stats.perimeter),
            ..ShapeDescriptors::default()
        };
        out.push(Candidate::new(
            DefectClass::Crack,
            confidence,
            stats.bbox,
            stats.area,
            shape,
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weldscan_core::kernels::gaussian_blur;

    fn field_with_line(x0: usize, y0: usize, len: usize, thick: usize) -> Field {
        let (w, h) = (60, 100);
        let data = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let on = (x0..x0 + thick).contains(&x) && (y0..y0 + len).contains(&y);
                if on {
                    40.0
                } else {
                    200.0
                }
            })
            .collect();
        let sharp = Field::new(w, h, data).expect("valid");
        gaussian_blur(&sharp, 5).expect("odd size")
    }

    #[test]
    fn blurred_vertical_line_is_a_crack() {
        let f = field_with_line(30, 20, 60, 2);
        let found = detect_cracks(&f, &CrackParams::default(), 0.0).expect("valid params");
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.class, DefectClass::Crack);
        assert!(c.shape.aspect_ratio.unwrap_or_default() > 3.0);
        // Edges sit on both flanks of the line, so the box covers it.
        assert!(c.bbox.x <= 30 && c.bbox.right() >= 32);
        assert!(c.bbox.y <= 20 && c.bbox.bottom() >= 80);
        assert!(c.confidence <= 0.95);
    }

    #[test]
    fn threshold_rejects_weak_candidates() {
        let f = field_with_line(30, 20, 60, 2);
        assert!(detect_cracks(&f, &CrackParams::default(), 0.96)
            .expect("valid params")
            .is_empty());
    }

    #[test]
    fn flat_field_has_no_cracks() {
        let f = Field::filled(50, 50, 128.0).expect("valid");
        assert!(detect_cracks(&f, &CrackParams::default(), 0.0)
            .expect("valid params")
            .is_empty());
    }
}
