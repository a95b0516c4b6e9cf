use weldscan_core::kernels::{binary_threshold, gaussian_blur, open, Polarity, StructuringElement};
use weldscan_core::region::{describe, trace_contours};
use weldscan_core::Field;

use crate::params::PorosityParams;
use crate::types::{cap_confidence, Candidate, DefectClass, ShapeDescriptors};
use crate::DetectError;

/// Small round dark blobs.
///
/// The blurred field is thresholded at every level in `dark_levels`; each
/// level contributes its own candidates, so one pore usually shows up once
/// per level and is collapsed later by NMS.
pub fn detect_porosity(
    field: &Field,
    params: &PorosityParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let blurred = gaussian_blur(field, params.blur_size)?;
    let element = StructuringElement::ellipse(params.open_size, params.open_size)?;

    let mut out = Vec::new();
    for &level in &params.dark_levels {
        let dark = open(&binary_threshold(&blurred, level, Polarity::Dark), &element);
        for region in trace_contours(&dark) {
            let stats = describe(&region);
            if stats.area <= params.min_area
                || stats.area >= params.max_area
                || stats.perimeter <= 0.0
                || stats.circularity <= params.min_circularity
            {
                continue;
            }
            let confidence = cap_confidence(
                0.3 + stats.circularity * 0.5 + (1.0 - stats.aspect_ratio / 3.0) * 0.2,
            );
            if confidence < confidence_threshold {
                continue;
            }
            let shape = ShapeDescriptors {
                aspect_ratio: Some(stats.aspect_ratio),
                circularity: Some(stats.circularity),
                solidity: Some(stats.solidity),
                perimeter: Some(stats.perimeter),
                ..ShapeDescriptors::default()
            };
            out.push(Candidate::new(
                DefectClass::Porosity,
                confidence,
                stats.bbox,
                stats.area,
                shape,
            ));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with_disk(cx: f32, cy: f32, r: f32) -> Field {
        let data = (0..80 * 80)
            .map(|i| {
                let (x, y) = ((i % 80) as f32, (i / 80) as f32);
                if (x - cx).powi(2) + (y - cy).powi(2) <= r * r {
                    30.0
                } else {
                    220.0
                }
            })
            .collect();
        Field::new(80, 80, data).expect("valid")
    }

    #[test]
    fn dark_disk_is_found_at_every_level() {
        let f = field_with_disk(40.0, 40.0, 9.0);
        let found = detect_porosity(&f, &PorosityParams::default(), 0.0).expect("valid params");
        assert_eq!(found.len(), 3);
        for c in &found {
            assert_eq!(c.class, DefectClass::Porosity);
            assert!(c.shape.circularity.unwrap_or_default() > 0.4);
            assert!((c.center.x - 40).abs() <= 1 && (c.center.y - 40).abs() <= 1);
        }
    }

    #[test]
    fn large_dark_areas_are_not_pores() {
        let f = field_with_disk(40.0, 40.0, 20.0);
        assert!(detect_porosity(&f, &PorosityParams::default(), 0.0)
            .expect("valid params")
            .is_empty());
    }

    #[test]
    fn even_blur_size_is_rejected() {
        let params = PorosityParams {
            blur_size: 4,
            ..PorosityParams::default()
        };
        let f = field_with_disk(40.0, 40.0, 9.0);
        assert!(detect_porosity(&f, &params, 0.0).is_err());
    }
}
