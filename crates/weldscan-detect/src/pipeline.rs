//! End-to-end detection: enhance, detect, suppress, score.

use log::debug;
#[cfg(feature = "tracing")]
use tracing::instrument;
use weldscan_core::Field;

use crate::enhance::enhance;
use crate::multiscale::{detect_at_scale, detect_multiscale};
use crate::nms::suppress;
use crate::params::DetectorParams;
use crate::postprocess::post_process;
use crate::types::{Detection, DetectorStrategy, EnhancementMode, ScaleContext};
use crate::DetectError;

/// Reject thresholds outside `[0, 1]` (NaN included).
pub fn validate_confidence_threshold(threshold: f32) -> Result<(), DetectError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(DetectError::InvalidConfidenceThreshold(threshold))
    }
}

/// Weld defect detector with a fixed parameter set.
///
/// The detector holds no state between calls; one instance can serve any
/// number of images, from any number of threads.
#[derive(Clone, Debug, Default)]
pub struct DefectDetector {
    params: DetectorParams,
}

impl DefectDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Detect defects in a grayscale field.
    ///
    /// With [`DetectorStrategy::Enhanced`] the field is enhanced once and the
    /// detectors run at every configured scale. [`DetectorStrategy::Simple`]
    /// runs its detectors once, on the unenhanced field, and scores quality
    /// on that same field. Both strategies share NMS and post-processing.
    /// The result is sorted by descending confidence.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width(), height = image.height(), mode = %mode)
        )
    )]
    pub fn detect(
        &self,
        image: &Field,
        mode: EnhancementMode,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectError> {
        validate_confidence_threshold(confidence_threshold)?;
        let ctx = ScaleContext {
            scale_factor: 1.0,
            enhancement_mode: mode,
            confidence_threshold,
        };

        let (scored_on, candidates) = match self.params.strategy {
            DetectorStrategy::Enhanced => {
                let enhanced = enhance(image, mode, &self.params.enhance)?;
                let found = detect_multiscale(&enhanced, &ctx, &self.params)?;
                (enhanced, found)
            }
            DetectorStrategy::Simple => {
                let gray = image.quantized();
                let found = detect_at_scale(&gray, &ctx, &self.params)?;
                (gray, found)
            }
        };
        let raw = candidates.len();
        let kept = suppress(candidates, self.params.nms.iou_threshold);
        let detections = post_process(kept, &scored_on, &self.params.post);
        debug!(
            "{} strategy: {raw} candidates, {} detections",
            self.params.strategy,
            detections.len()
        );
        Ok(detections)
    }
}

/// Detect with default parameters.
pub fn detect(
    image: &Field,
    mode: EnhancementMode,
    confidence_threshold: f32,
) -> Result<Vec<Detection>, DetectError> {
    DefectDetector::default().detect(image, mode, confidence_threshold)
}
