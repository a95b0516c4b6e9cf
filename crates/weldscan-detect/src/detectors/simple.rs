//! First-generation heuristics, kept as the [`DetectorStrategy::Simple`]
//! strategy.
//!
//! These run on the raw grayscale field at scale 1 and use their own
//! confidence formulas. Unlike the enhanced detectors they accept a candidate
//! only when its confidence is strictly above the threshold.
//!
//! [`DetectorStrategy::Simple`]: crate::DetectorStrategy::Simple

use std::f32::consts::PI;

use weldscan_core::kernels::{
    binary_threshold, close, gaussian_blur, median_filter, sobel_gradient_magnitude, Polarity,
    StructuringElement, INTENSITY_MAX,
};
use weldscan_core::region::{
    connected_components, describe, irregularity, trace_contours, Connectivity,
};
use weldscan_core::{BoundingBox, Field, Mask};

use crate::params::SimpleParams;
use crate::types::{cap_confidence, Candidate, DefectClass, ShapeDescriptors};
use crate::DetectError;

/// Angular step of the ring test that decides whether a circle is present.
const RING_STEP_DEG: usize = 15;
/// Angular step of the finer ring used to score circularity.
const CIRCULARITY_STEP_DEG: usize = 10;

/// Elongated components of the closed Sobel edge map.
pub fn detect_cracks_simple(
    field: &Field,
    params: &SimpleParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let blurred = gaussian_blur(field, params.crack_blur_size)?;
    let magnitude = sobel_gradient_magnitude(&blurred);
    let edges = binary_threshold(
        &magnitude,
        params.gradient_floor / INTENSITY_MAX,
        Polarity::Bright,
    );
    let element = StructuringElement::vertical_line(params.crack_close_length)?;
    let joined = close(&edges, &element);

    let mut out = Vec::new();
    for region in trace_contours(&joined) {
        let stats = describe(&region);
        if stats.area <= params.crack_min_area
            || stats.aspect_ratio <= params.crack_min_aspect_ratio
        {
            continue;
        }
        let confidence =
            cap_confidence(0.6 + stats.aspect_ratio / 10.0 + stats.area / 1000.0);
        if confidence <= confidence_threshold {
            continue;
        }
        let shape = ShapeDescriptors {
            aspect_ratio: Some(stats.aspect_ratio),
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

/// Dark circles found by sampling rings on a coarse grid.
///
/// Every `(x, y, r)` whose ring is mostly dark becomes a candidate, so one
/// pore yields many overlapping boxes; NMS reduces them.
pub fn detect_porosity_simple(
    field: &Field,
    params: &SimpleParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let filtered = median_filter(field, params.median_size)?;
    let dark = binary_threshold(&filtered, params.dark_threshold, Polarity::Dark);
    let (w, h) = (field.width(), field.height());
    let margin = params.max_radius;
    let step = params.grid_step.max(1);
    let radius_step = params.radius_step.max(1);

    let mut out = Vec::new();
    if w <= 2 * margin || h <= 2 * margin {
        return Ok(out);
    }
    for cy in (margin..h - margin).step_by(step) {
        for cx in (margin..w - margin).step_by(step) {
            for r in (params.min_radius..params.max_radius).step_by(radius_step) {
                let (cx, cy, r) = (cx as f32, cy as f32, r as f32);
                if ring_fill(&dark, cx, cy, r, RING_STEP_DEG) <= params.ring_fill_ratio {
                    continue;
                }
                let circularity = ring_fill(&dark, cx, cy, r, CIRCULARITY_STEP_DEG);
                let confidence = cap_confidence(0.5 + circularity * 0.4 + (r / 50.0) * 0.1);
                if confidence <= confidence_threshold {
                    continue;
                }
                let bbox = BoundingBox::new(
                    (cx - r).max(0.0) as i32,
                    (cy - r).max(0.0) as i32,
                    (2.0 * r).min(w as f32) as i32,
                    (2.0 * r).min(h as f32) as i32,
                );
                let shape = ShapeDescriptors {
                    circularity: Some(circularity),
                    radius: Some(r),
                    ..ShapeDescriptors::default()
                };
                out.push(Candidate::new(
                    DefectClass::Porosity,
                    confidence,
                    bbox,
                    PI * r * r,
                    shape,
                ));
            }
        }
    }
    Ok(out)
}

/// Bright 4-connected regions that fill little of their bounding box.
pub fn detect_slag_simple(
    field: &Field,
    params: &SimpleParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let bright = binary_threshold(field, params.bright_threshold, Polarity::Bright);
    let mut out = Vec::new();
    for region in connected_components(&bright, Connectivity::Four, params.min_region_pixels) {
        let area = region.area() as f32;
        let irregular = irregularity(&region);
        if area <= params.slag_min_area || irregular <= params.min_irregularity {
            continue;
        }
        let confidence = cap_confidence(0.5 + irregular * 0.3 + (area / 1000.0) * 0.2);
        if confidence <= confidence_threshold {
            continue;
        }
        let shape = ShapeDescriptors {
            irregularity: Some(irregular),
            ..ShapeDescriptors::default()
        };
        out.push(Candidate::new(
            DefectClass::Slag,
            confidence,
            region.bbox(),
            area,
            shape,
        ));
    }
    Ok(out)
}

/// Fraction of in-bounds ring samples that hit the mask.
///
/// Sample positions are truncated toward zero, one sample every `step_deg`
/// degrees starting at angle 0.
fn ring_fill(mask: &Mask, cx: f32, cy: f32, r: f32, step_deg: usize) -> f32 {
    let (mut inside, mut hits) = (0u32, 0u32);
    for deg in (0..360).step_by(step_deg) {
        let theta = (deg as f32).to_radians();
        let x = (cx + r * theta.cos()) as i32;
        let y = (cy + r * theta.sin()) as i32;
        if x < 0 || y < 0 || x >= mask.width() as i32 || y >= mask.height() as i32 {
            continue;
        }
        inside += 1;
        if mask.get(x as usize, y as usize) {
            hits += 1;
        }
    }
    if inside == 0 {
        0.0
    } else {
        hits as f32 / inside as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: usize, h: usize, paint: impl Fn(usize, usize) -> Option<f32>) -> Field {
        let data = (0..w * h)
            .map(|i| paint(i % w, i / w).unwrap_or(150.0))
            .collect();
        Field::new(w, h, data).expect("valid")
    }

    #[test]
    fn ring_fill_counts_only_in_bounds_samples() {
        let all = Mask::from_vec(5, 5, vec![true; 25]).expect("rectangular");
        assert_eq!(ring_fill(&all, 0.0, 0.0, 2.0, 15), 1.0);
        let none = Mask::new(5, 5).expect("non-empty");
        assert_eq!(ring_fill(&none, 2.0, 2.0, 1.0, 10), 0.0);
    }

    #[test]
    fn dark_disk_triggers_the_ring_search() {
        let f = canvas(140, 140, |x, y| {
            let (dx, dy) = (x as f32 - 70.0, y as f32 - 70.0);
            (dx * dx + dy * dy <= 20.0 * 20.0).then_some(20.0)
        });
        let found =
            detect_porosity_simple(&f, &SimpleParams::default(), 0.5).expect("valid params");
        assert!(!found.is_empty());
        for c in &found {
            assert_eq!(c.class, DefectClass::Porosity);
            assert!(c.confidence > 0.5 && c.confidence <= 0.95);
            let r = c.shape.radius.unwrap_or_default();
            assert!((5.0..50.0).contains(&r));
        }
        // Rings wider than the disk never pass the fill test.
        assert!(found.iter().all(|c| c.shape.radius.unwrap_or_default() <= 20.0));
    }

    #[test]
    fn bright_l_shape_is_slag() {
        let f = canvas(60, 60, |x, y| {
            let vertical = (10..16).contains(&x) && (10..40).contains(&y);
            let foot = (10..40).contains(&x) && (34..40).contains(&y);
            (vertical || foot).then_some(230.0)
        });
        let found = detect_slag_simple(&f, &SimpleParams::default(), 0.5).expect("valid params");
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.bbox, BoundingBox::new(10, 10, 30, 30));
        // 6 * 30 + 24 * 6 = 324 pixels in a 900 pixel box.
        assert_eq!(c.area, 324.0);
        let irregular = c.shape.irregularity.unwrap_or_default();
        assert!((irregular - (1.0 - 324.0 / 900.0)).abs() < 1e-5);
        let expected = 0.5 + irregular * 0.3 + 0.324 * 0.2;
        assert!((c.confidence - expected).abs() < 1e-5);
    }

    #[test]
    fn thin_bar_is_a_simple_crack() {
        let f = canvas(40, 80, |x, y| {
            ((18..20).contains(&x) && (10..70).contains(&y)).then_some(30.0)
        });
        let found = detect_cracks_simple(&f, &SimpleParams::default(), 0.5).expect("valid params");
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert!(c.shape.aspect_ratio.unwrap_or_default() > 3.0);
        assert!(c.bbox.x <= 18 && c.bbox.right() >= 20);
        assert_eq!(c.confidence, 0.95);
    }

    #[test]
    fn flat_field_yields_nothing() {
        let f = Field::filled(120, 120, 150.0).expect("valid");
        let params = SimpleParams::default();
        assert!(detect_cracks_simple(&f, &params, 0.0).expect("valid").is_empty());
        assert!(detect_porosity_simple(&f, &params, 0.0).expect("valid").is_empty());
        assert!(detect_slag_simple(&f, &params, 0.0).expect("valid").is_empty());
    }
}
