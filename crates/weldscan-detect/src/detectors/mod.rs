//! Per-class candidate detectors.
//!
//! Each detector maps a field and a confidence threshold to zero or more
//! [`Candidate`]s in the field's own pixel coordinates. Finding nothing is a
//! normal outcome; only invalid parameters produce an error.

mod crack;
mod porosity;
mod simple;
mod slag;

pub use crack::detect_cracks;
pub use porosity::detect_porosity;
pub use simple::{detect_cracks_simple, detect_porosity_simple, detect_slag_simple};
pub use slag::detect_slag;

use weldscan_core::Field;

use crate::params::DetectorParams;
use crate::types::{Candidate, DefectClass, DetectorStrategy};
use crate::DetectError;

/// Run the detector for `class` from the strategy selected in `params`.
pub fn detect_class(
    class: DefectClass,
    field: &Field,
    params: &DetectorParams,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>, DetectError> {
    match (params.strategy, class) {
        (DetectorStrategy::Enhanced, DefectClass::Crack) => {
            detect_cracks(field, &params.crack, confidence_threshold)
        }
        (DetectorStrategy::Enhanced, DefectClass::Porosity) => {
            detect_porosity(field, &params.porosity, confidence_threshold)
        }
        (DetectorStrategy::Enhanced, DefectClass::Slag) => {
            detect_slag(field, &params.slag, confidence_threshold)
        }
        (DetectorStrategy::Simple, DefectClass::Crack) => {
            detect_cracks_simple(field, &params.simple, confidence_threshold)
        }
        (DetectorStrategy::Simple, DefectClass::Porosity) => {
            detect_porosity_simple(field, &params.simple, confidence_threshold)
        }
        (DetectorStrategy::Simple, DefectClass::Slag) => {
            detect_slag_simple(field, &params.simple, confidence_threshold)
        }
    }
}
