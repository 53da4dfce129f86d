//! GeoTIFF output for working rasters
//!
//! Writers re-materialize a container on disk using the profile captured at
//! load time. The output pixel type always reflects the in-memory data, so
//! a profile whose `dtype` went stale cannot corrupt a write.

use crate::core::raster::WorkingRaster;
use crate::types::{PixelType, RasterError, RasterResult};
use gdal::raster::{Buffer, RasterCreationOption};
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use std::path::Path;

/// Choices for how a container lands on disk
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// 1-based band slot that receives the data. Defaults to the source
    /// profile's band count, so a container loaded from an n-band scene
    /// writes into band n of an n-band file.
    pub band_index: Option<usize>,
    /// GeoTIFF compression (e.g. "LZW", "DEFLATE"); uncompressed when unset
    pub compression: Option<String>,
}

/// Writer for working rasters
pub struct RasterWriter;

impl RasterWriter {
    /// Save a single-band container with default options
    pub fn save<P: AsRef<Path>>(raster: &WorkingRaster, path: P) -> RasterResult<()> {
        Self::save_with_options(raster, path, &SaveOptions::default())
    }

    /// Save a single-band container to a GeoTIFF shaped by its profile.
    ///
    /// The file is created with the profile's extent, transform, CRS,
    /// no-data marker, and band count; the container's band goes into the
    /// slot selected by `options.band_index`. Pixels are written as Float32
    /// regardless of the profile's recorded `dtype`. A container holding
    /// more than one band is rejected, since only one band slot is written.
    pub fn save_with_options<P: AsRef<Path>>(
        raster: &WorkingRaster,
        path: P,
        options: &SaveOptions,
    ) -> RasterResult<()> {
        let path = path.as_ref();
        log::info!("Saving raster to: {}", path.display());

        if raster.band_count() != 1 {
            return Err(RasterError::Processing(format!(
                "cannot write a {}-band container into a single band slot",
                raster.band_count()
            )));
        }

        let profile = &raster.profile;
        let driver = DriverManager::get_driver_by_name(&profile.driver)?;

        let mut creation_options = Vec::new();
        if let Some(compression) = &options.compression {
            creation_options.push(RasterCreationOption {
                key: "COMPRESS",
                value: compression.as_str(),
            });
        }

        let mut dataset = driver.create_with_band_type_with_options::<f32, _>(
            path,
            profile.width as isize,
            profile.height as isize,
            profile.count as isize,
            &creation_options,
        )?;

        // Carry over the georeferencing captured at load time
        dataset.set_geo_transform(&profile.transform.to_gdal())?;
        if let Some(wkt) = &profile.crs {
            dataset.set_spatial_ref(&SpatialRef::from_wkt(wkt)?)?;
        }

        let band_index = options.band_index.unwrap_or(profile.count);
        log::debug!(
            "Writing {}x{} {} data into band {} of {}",
            raster.cols(),
            raster.rows(),
            PixelType::Float32,
            band_index,
            profile.count
        );

        let mut rasterband = dataset.rasterband(band_index as isize)?;
        if let Some(nodata) = profile.nodata {
            rasterband.set_no_data_value(Some(nodata))?;
        }

        let flat_data: Vec<f32> = raster.band(0).iter().copied().collect();
        let buffer = Buffer::new((raster.cols(), raster.rows()), flat_data);
        rasterband.write((0, 0), (raster.cols(), raster.rows()), &buffer)?;

        Ok(())
    }

    /// Save a thresholded container as a single-band byte mask.
    ///
    /// Values are clamped into 0..255 and truncated. The file carries the
    /// container's transform and CRS but always exactly one band.
    pub fn save_mask<P: AsRef<Path>>(raster: &WorkingRaster, path: P) -> RasterResult<()> {
        let path = path.as_ref();
        log::info!("Saving byte mask to: {}", path.display());

        if raster.band_count() != 1 {
            return Err(RasterError::Processing(format!(
                "cannot write a {}-band container into a single band slot",
                raster.band_count()
            )));
        }

        let profile = &raster.profile;
        let driver = DriverManager::get_driver_by_name(&profile.driver)?;
        let mut dataset = driver.create_with_band_type::<u8, _>(
            path,
            profile.width as isize,
            profile.height as isize,
            1,
        )?;

        dataset.set_geo_transform(&profile.transform.to_gdal())?;
        if let Some(wkt) = &profile.crs {
            dataset.set_spatial_ref(&SpatialRef::from_wkt(wkt)?)?;
        }

        let mut rasterband = dataset.rasterband(1)?;
        let flat_data: Vec<u8> = raster
            .band(0)
            .iter()
            .map(|&v| v.clamp(0.0, 255.0) as u8)
            .collect();
        let buffer = Buffer::new((raster.cols(), raster.rows()), flat_data);
        rasterband.write((0, 0), (raster.cols(), raster.rows()), &buffer)?;

        Ok(())
    }
}
