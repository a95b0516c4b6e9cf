//! Running the detectors over a pyramid of resize factors.
//!
//! The enhanced field is resized once per scale; every `(scale, class)` pair
//! is then an independent job. With the `rayon` feature the jobs run on the
//! global thread pool. Results are always merged in job order (scales as
//! configured, classes in [`DefectClass::ALL`] order), so the output does not
//! depend on the feature or on scheduling.

use std::borrow::Cow;

use log::trace;
#[cfg(feature = "tracing")]
use tracing::instrument;
use weldscan_core::kernels::resize_bilinear;
use weldscan_core::Field;

use crate::detectors::detect_class;
use crate::params::DetectorParams;
use crate::types::{Candidate, DefectClass, ScaleContext};
use crate::DetectError;

/// Reject non-finite or non-positive scale factors.
pub fn validate_scale(scale: f32) -> Result<(), DetectError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(DetectError::InvalidScale(scale))
    }
}

fn resized(enhanced: &Field, scale: f32) -> Result<Cow<'_, Field>, DetectError> {
    validate_scale(scale)?;
    if scale == 1.0 {
        return Ok(Cow::Borrowed(enhanced));
    }
    Ok(Cow::Owned(resize_bilinear(enhanced, scale)?))
}

/// One detector on an already-resized field, mapped back by `1 / scale`.
fn run_job(
    field: &Field,
    class: DefectClass,
    ctx: &ScaleContext,
    params: &DetectorParams,
) -> Result<Vec<Candidate>, DetectError> {
    let scale = ctx.scale_factor;
    let found = detect_class(class, field, params, ctx.confidence_threshold)?;
    trace!("{class} at scale {scale}: {} candidates", found.len());
    Ok(found
        .into_iter()
        .map(|c| c.with_scale(scale).rescaled(1.0 / scale))
        .collect())
}

/// All detectors at the single scale in `ctx`, in original-image coordinates.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(enhanced, params),
        fields(scale = ctx.scale_factor, mode = %ctx.enhancement_mode)
    )
)]
pub fn detect_at_scale(
    enhanced: &Field,
    ctx: &ScaleContext,
    params: &DetectorParams,
) -> Result<Vec<Candidate>, DetectError> {
    let field = resized(enhanced, ctx.scale_factor)?;
    let mut out = Vec::new();
    for class in DefectClass::ALL {
        out.extend(run_job(&field, class, ctx, params)?);
    }
    Ok(out)
}

/// Every detector at every scale of `params.scales`, merged in job order.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(enhanced, params),
        fields(scales = params.scales.len(), mode = %ctx.enhancement_mode)
    )
)]
pub fn detect_multiscale(
    enhanced: &Field,
    ctx: &ScaleContext,
    params: &DetectorParams,
) -> Result<Vec<Candidate>, DetectError> {
    if params.scales.is_empty() {
        return Err(DetectError::NoScales);
    }
    let levels = params
        .scales
        .iter()
        .map(|&scale| -> Result<_, DetectError> {
            let field = resized(enhanced, scale)?;
            let ctx = ScaleContext {
                scale_factor: scale,
                ..*ctx
            };
            Ok((ctx, field))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let jobs: Vec<(usize, DefectClass)> = (0..levels.len())
        .flat_map(|level| DefectClass::ALL.into_iter().map(move |class| (level, class)))
        .collect();
    let run = |&(level, class): &(usize, DefectClass)| {
        let (ctx, field) = &levels[level];
        run_job(field, class, ctx, params)
    };

    #[cfg(feature = "rayon")]
    let results: Vec<Result<Vec<Candidate>, DetectError>> = {
        use rayon::prelude::*;
        jobs.par_iter().map(run).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let results: Vec<Result<Vec<Candidate>, DetectError>> = jobs.iter().map(run).collect();

    let mut out = Vec::new();
    for result in results {
        out.extend(result?);
    }
    trace!("{} jobs produced {} candidates", jobs.len(), out.len());
    Ok(out)
}
