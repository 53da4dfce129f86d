use approx::assert_relative_eq;
use floeberg::{
    reconcile_transform, GeoTransform, RasterLoader, RasterProfile, RasterWriter, WorkingRaster,
};
use ndarray::Array2;
use std::path::Path;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_with_transform(path: &Path, coefficients: [f64; 6]) {
    let band = Array2::from_shape_fn((2, 3), |(r, c)| (r * 3 + c) as f32);
    let mut profile = RasterProfile::synthetic(3, 2, 1);
    profile.transform = GeoTransform::from_gdal(coefficients);
    let raster = WorkingRaster::from_band(band, profile);
    RasterWriter::save(&raster, path).expect("Failed to write fixture");
}

#[test]
fn mismatched_transform_is_overwritten_in_place() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let target = dir.path().join("target.tif");
    let reference = dir.path().join("reference.tif");
    write_with_transform(&target, [300.0, 5.0, 0.0, 400.0, 0.0, -5.0]);
    write_with_transform(&reference, [500.0, 20.0, 0.0, 900.0, 0.0, -20.0]);

    reconcile_transform(&target, &reference).expect("Failed to reconcile");

    let updated = RasterLoader::load(&target).expect("Failed to reload target");
    assert_eq!(
        updated.profile.transform,
        GeoTransform::from_gdal([500.0, 20.0, 0.0, 900.0, 0.0, -20.0])
    );
    // Pixel values are untouched by the in-place update
    assert_relative_eq!(updated.data[[1, 2, 0]], 5.0);
}

#[test]
fn ungeoreferenced_target_gets_the_reference_transform() {
    // Identity georeferencing is dropped by the GTiff driver, leaving a
    // bare image file, which is how detection outputs often arrive
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let target = dir.path().join("target.tif");
    let reference = dir.path().join("reference.tif");
    write_with_transform(&target, [0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    write_with_transform(&reference, [500.0, 20.0, 0.0, 900.0, 0.0, -20.0]);

    reconcile_transform(&target, &reference).expect("Failed to reconcile");

    let updated = RasterLoader::load(&target).expect("Failed to reload target");
    assert_eq!(
        updated.profile.transform,
        GeoTransform::from_gdal([500.0, 20.0, 0.0, 900.0, 0.0, -20.0])
    );
}

#[test]
fn matching_transforms_leave_the_target_alone() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let target = dir.path().join("target.tif");
    let reference = dir.path().join("reference.tif");
    let shared = [650000.0, 40.0, 0.0, 8300000.0, 0.0, -40.0];
    write_with_transform(&target, shared);
    write_with_transform(&reference, shared);

    reconcile_transform(&target, &reference).expect("Failed to reconcile");

    let updated = RasterLoader::load(&target).expect("Failed to reload target");
    assert_eq!(updated.profile.transform, GeoTransform::from_gdal(shared));
    assert_relative_eq!(updated.data[[0, 0, 0]], 0.0);
    assert_relative_eq!(updated.data[[1, 2, 0]], 5.0);
}

#[test]
fn missing_target_file_is_an_error() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let reference = dir.path().join("reference.tif");
    write_with_transform(&reference, [500.0, 20.0, 0.0, 900.0, 0.0, -20.0]);

    let result = reconcile_transform(dir.path().join("absent.tif"), &reference);
    assert!(result.is_err());
}

#[test]
fn missing_reference_file_is_an_error() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let target = dir.path().join("target.tif");
    write_with_transform(&target, [300.0, 5.0, 0.0, 400.0, 0.0, -5.0]);

    let result = reconcile_transform(&target, dir.path().join("absent.tif"));
    assert!(result.is_err());
}
