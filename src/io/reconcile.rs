//! Transform reconciliation between detection outputs and reference scenes
//!
//! Products written by external tooling occasionally come back with a
//! default or shifted affine transform. Reconciling stamps the reference
//! scene's transform onto such a file in place, so downstream overlays line
//! up again.

use crate::types::{GeoTransform, RasterResult};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use std::path::Path;

/// Copy the reference raster's affine transform onto the target file.
///
/// The target is rewritten in place, and only when the six coefficients
/// differ exactly; a matching transform leaves the file untouched. A target
/// carrying no georeferencing at all reads as the identity transform and is
/// stamped. The reference is opened read-only and never modified; a
/// reference whose transform cannot be read is an error.
pub fn reconcile_transform<P, Q>(target: P, reference: Q) -> RasterResult<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let target = target.as_ref();
    let reference = reference.as_ref();

    let reference_transform = Dataset::open(reference)?.geo_transform()?;

    let mut target_dataset = Dataset::open_ex(
        target,
        DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
            ..Default::default()
        },
    )?;
    // Products without georeferencing read as GDAL's identity default
    let target_transform = target_dataset
        .geo_transform()
        .unwrap_or([0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    if target_transform == reference_transform {
        log::debug!(
            "Transform of {} already matches {}",
            target.display(),
            reference.display()
        );
        return Ok(());
    }

    log::info!(
        "Updating transform of {} to match {}: {:?} -> {:?}",
        target.display(),
        reference.display(),
        GeoTransform::from_gdal(target_transform),
        GeoTransform::from_gdal(reference_transform)
    );
    target_dataset.set_geo_transform(&reference_transform)?;

    Ok(())
}
