//! Raster loading into working containers
//!
//! Loading reads every band of a GDAL dataset into a band-interleaved `f32`
//! stack, optionally cropped and masked by vector geometries. The source
//! dataset is only held open for the duration of the call.

use crate::core::raster::WorkingRaster;
use crate::types::{GeoTransform, PixelType, RasterError, RasterProfile, RasterResult};
use gdal::vector::Geometry;
use gdal::{Dataset, DriverManager};
use gdal_sys::OGREnvelope;
use ndarray::{Array2, Axis};
use std::path::Path;

/// Loader for georeferenced rasters
pub struct RasterLoader;

impl RasterLoader {
    /// Load every band of a raster into a working container.
    ///
    /// Bands are read in source order, promoted to `f32`, and stacked along
    /// a trailing band axis, so a single-band file yields a stack of depth
    /// one. The source file is closed again before this returns.
    pub fn load<P: AsRef<Path>>(path: P) -> RasterResult<WorkingRaster> {
        let path = path.as_ref();
        log::info!("Loading raster from: {}", path.display());

        let dataset = Dataset::open(path)?;
        let profile = Self::read_profile(&dataset)?;
        let (width, height) = dataset.raster_size();
        log::debug!(
            "Raster size: {}x{}, {} band(s), {}",
            width,
            height,
            profile.count,
            profile.dtype
        );

        let mut bands = Vec::with_capacity(profile.count);
        for index in 1..=profile.count {
            let band = dataset.rasterband(index as isize)?;
            let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
            bands.push(Array2::from_shape_vec((height, width), buffer.data)?);
        }

        let views: Vec<_> = bands.iter().map(|band| band.view()).collect();
        let data = ndarray::stack(Axis(2), &views)?;

        Ok(WorkingRaster {
            data,
            source_band_count: profile.count,
            profile,
            source: Some(path.to_path_buf()),
        })
    }

    /// Load a raster cropped and masked by a set of geometries.
    ///
    /// The window read from disk is the pixel-aligned bounding box of all
    /// geometries, intersected with the raster extent. Pixels inside the
    /// window but outside every geometry are filled with the band's no-data
    /// value (0.0 when the band has none). The returned profile describes
    /// the cropped window, not the full source raster.
    ///
    /// Geometries are taken to be in the raster's coordinate reference
    /// system. A mask that does not overlap the raster is an error.
    pub fn load_masked<P: AsRef<Path>>(path: P, mask: &[Geometry]) -> RasterResult<WorkingRaster> {
        let path = path.as_ref();
        log::info!(
            "Loading raster from: {} (masked by {} geometry(ies))",
            path.display(),
            mask.len()
        );

        let dataset = Dataset::open(path)?;
        let mut profile = Self::read_profile(&dataset)?;
        let (width, height) = dataset.raster_size();

        let envelope = Self::combined_envelope(mask)?;
        let (col_off, row_off, win_width, win_height) =
            Self::pixel_window(&profile.transform, &envelope, width, height)?;
        log::debug!(
            "Mask window: offset ({}, {}), size {}x{}",
            col_off,
            row_off,
            win_width,
            win_height
        );

        let window_transform = profile.transform.window(col_off as f64, row_off as f64);
        let coverage = Self::burn_mask(mask, &window_transform, win_width, win_height)?;

        let mut bands = Vec::with_capacity(profile.count);
        for index in 1..=profile.count {
            let band = dataset.rasterband(index as isize)?;
            let fill = band.no_data_value().unwrap_or(0.0) as f32;
            let buffer = band.read_as::<f32>(
                (col_off, row_off),
                (win_width, win_height),
                (win_width, win_height),
                None,
            )?;
            let mut grid = Array2::from_shape_vec((win_height, win_width), buffer.data)?;
            for (pixel, &covered) in grid.iter_mut().zip(coverage.iter()) {
                if covered == 0 {
                    *pixel = fill;
                }
            }
            bands.push(grid);
        }

        let views: Vec<_> = bands.iter().map(|band| band.view()).collect();
        let data = ndarray::stack(Axis(2), &views)?;

        profile.width = win_width;
        profile.height = win_height;
        profile.transform = window_transform;

        Ok(WorkingRaster {
            data,
            source_band_count: profile.count,
            profile,
            source: Some(path.to_path_buf()),
        })
    }

    /// Capture the profile of an open dataset
    fn read_profile(dataset: &Dataset) -> RasterResult<RasterProfile> {
        let (width, height) = dataset.raster_size();
        // GDAL reports no transform for bare images; fall back to its
        // identity default so ungeoreferenced rasters still load
        let transform = GeoTransform::from_gdal(
            dataset
                .geo_transform()
                .unwrap_or([0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
        );
        let count = dataset.raster_count() as usize;

        let first_band = dataset.rasterband(1)?;
        let dtype = PixelType::from_gdal(first_band.band_type())?;
        let nodata = first_band.no_data_value();

        let crs = dataset
            .spatial_ref()
            .ok()
            .and_then(|srs| srs.to_wkt().ok())
            .filter(|wkt| !wkt.is_empty());

        Ok(RasterProfile {
            width,
            height,
            transform,
            count,
            dtype,
            crs,
            nodata,
            driver: dataset.driver().short_name(),
        })
    }

    /// Union of the bounding envelopes of all mask geometries
    fn combined_envelope(mask: &[Geometry]) -> RasterResult<OGREnvelope> {
        let mut combined: Option<OGREnvelope> = None;
        for geometry in mask {
            let envelope = geometry.envelope();
            combined = Some(match combined {
                None => envelope,
                Some(current) => OGREnvelope {
                    MinX: current.MinX.min(envelope.MinX),
                    MaxX: current.MaxX.max(envelope.MaxX),
                    MinY: current.MinY.min(envelope.MinY),
                    MaxY: current.MaxY.max(envelope.MaxY),
                },
            });
        }
        combined.ok_or_else(|| RasterError::Geometry("mask contains no geometries".to_string()))
    }

    /// Pixel window covering `envelope`, clipped to the raster extent.
    ///
    /// Returns (col_off, row_off, width, height) of the window to read, or
    /// a geometry error when the envelope misses the raster entirely.
    fn pixel_window(
        transform: &GeoTransform,
        envelope: &OGREnvelope,
        raster_width: usize,
        raster_height: usize,
    ) -> RasterResult<(isize, isize, usize, usize)> {
        let inverse = transform.invert().ok_or_else(|| {
            RasterError::Geometry("raster transform is singular and cannot be inverted".to_string())
        })?;

        // Track all four envelope corners so rotated transforms stay covered
        let corners = [
            (envelope.MinX, envelope.MinY),
            (envelope.MinX, envelope.MaxY),
            (envelope.MaxX, envelope.MinY),
            (envelope.MaxX, envelope.MaxY),
        ];
        let mut col_min = f64::INFINITY;
        let mut col_max = f64::NEG_INFINITY;
        let mut row_min = f64::INFINITY;
        let mut row_max = f64::NEG_INFINITY;
        for (x, y) in corners {
            let (col, row) = inverse.apply(x, y);
            col_min = col_min.min(col);
            col_max = col_max.max(col);
            row_min = row_min.min(row);
            row_max = row_max.max(row);
        }

        let col_start = col_min.floor().max(0.0) as isize;
        let row_start = row_min.floor().max(0.0) as isize;
        let col_end = col_max.ceil().min(raster_width as f64) as isize;
        let row_end = row_max.ceil().min(raster_height as f64) as isize;

        if col_end <= col_start || row_end <= row_start {
            return Err(RasterError::Geometry(
                "mask geometries do not intersect the raster extent".to_string(),
            ));
        }

        Ok((
            col_start,
            row_start,
            (col_end - col_start) as usize,
            (row_end - row_start) as usize,
        ))
    }

    /// Burn mask geometries into a window-sized coverage grid.
    ///
    /// Covered pixels read 1, everything else 0, row-major over the window.
    fn burn_mask(
        mask: &[Geometry],
        window_transform: &GeoTransform,
        width: usize,
        height: usize,
    ) -> RasterResult<Vec<u8>> {
        let driver = DriverManager::get_driver_by_name("MEM")?;
        let mut coverage =
            driver.create_with_band_type::<u8, _>("", width as isize, height as isize, 1)?;
        coverage.set_geo_transform(&window_transform.to_gdal())?;

        let burn_values = vec![1.0; mask.len()];
        gdal::raster::rasterize(&mut coverage, &[1], mask, &burn_values, None)?;

        let buffer = coverage
            .rasterband(1)?
            .read_as::<u8>((0, 0), (width, height), (width, height), None)?;
        Ok(buffer.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn north_up() -> GeoTransform {
        // 10x10 raster spanning x 100..200, y 100..200
        GeoTransform::from_gdal([100.0, 10.0, 0.0, 200.0, 0.0, -10.0])
    }

    #[test]
    fn pixel_window_covers_an_interior_envelope() {
        let envelope = OGREnvelope {
            MinX: 115.0,
            MaxX: 145.0,
            MinY: 155.0,
            MaxY: 185.0,
        };
        let window = RasterLoader::pixel_window(&north_up(), &envelope, 10, 10).unwrap();
        assert_eq!(window, (1, 1, 4, 4));
    }

    #[test]
    fn pixel_window_clips_to_the_raster_edge() {
        let envelope = OGREnvelope {
            MinX: 50.0,
            MaxX: 125.0,
            MinY: 150.0,
            MaxY: 300.0,
        };
        let (col_off, row_off, width, height) =
            RasterLoader::pixel_window(&north_up(), &envelope, 10, 10).unwrap();
        assert_eq!(col_off, 0);
        assert_eq!(row_off, 0);
        assert_eq!(width, 3);
        assert_eq!(height, 5);
    }

    #[test]
    fn disjoint_envelope_is_rejected() {
        let envelope = OGREnvelope {
            MinX: 1000.0,
            MaxX: 1100.0,
            MinY: 1000.0,
            MaxY: 1100.0,
        };
        let result = RasterLoader::pixel_window(&north_up(), &envelope, 10, 10);
        assert!(matches!(result, Err(RasterError::Geometry(_))));
    }

    #[test]
    fn empty_mask_has_no_envelope() {
        let result = RasterLoader::combined_envelope(&[]);
        assert!(matches!(result, Err(RasterError::Geometry(_))));
    }

    #[test]
    fn combined_envelope_unions_all_geometries() {
        let first = Geometry::from_wkt("POLYGON((0 0, 0 10, 10 10, 10 0, 0 0))").unwrap();
        let second = Geometry::from_wkt("POLYGON((20 20, 20 30, 30 30, 30 20, 20 20))").unwrap();
        let envelope = RasterLoader::combined_envelope(&[first, second]).unwrap();
        assert_eq!(envelope.MinX, 0.0);
        assert_eq!(envelope.MaxX, 30.0);
        assert_eq!(envelope.MinY, 0.0);
        assert_eq!(envelope.MaxY, 30.0);
    }
}
