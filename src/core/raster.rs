//! In-memory working copy of a georeferenced raster
//!
//! Detection pipelines read a scene once, then threshold, rescale, and save
//! intermediate products without touching the source file again. The container
//! keeps the pixel data together with the profile captured at load time so
//! every derived product stays georeferenced.

use crate::core::render;
use crate::types::{BandImage, BandStack, PixelValue, RasterProfile, RasterResult};
use ndarray::{ArrayView2, Axis};
use std::path::{Path, PathBuf};

/// Mutable in-memory raster plus the georeferencing of its source.
///
/// `data` is always band-interleaved `(rows, cols, bands)`; a single-band
/// source occupies a stack of depth one. `profile` keeps describing the
/// source dataset while `data` is transformed in place, so a container
/// thresholded down to a detection mask can still be written georeferenced
/// next to the scene it came from.
///
/// Cloning copies the pixel data; a clone never aliases the original.
#[derive(Debug, Clone)]
pub struct WorkingRaster {
    /// Pixel data (rows x cols x bands)
    pub data: BandStack,
    /// Extent, transform, band count, and no-data marker of the source
    pub profile: RasterProfile,
    /// Band count of the source dataset, independent of `data`'s depth
    pub source_band_count: usize,
    /// Path the raster was loaded from, when it came from disk
    pub source: Option<PathBuf>,
}

impl WorkingRaster {
    /// Wrap an in-memory band stack that did not come from a file
    pub fn new(data: BandStack, profile: RasterProfile) -> Self {
        let source_band_count = data.len_of(Axis(2));
        WorkingRaster {
            data,
            profile,
            source_band_count,
            source: None,
        }
    }

    /// Wrap a single band as a stack of depth one
    pub fn from_band(band: BandImage, profile: RasterProfile) -> Self {
        Self::new(band.insert_axis(Axis(2)), profile)
    }

    /// Number of pixel rows
    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Number of pixel columns
    pub fn cols(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Number of bands currently held in memory
    pub fn band_count(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// View of one band, zero-indexed.
    ///
    /// Panics when `index` is out of range, like any array index.
    pub fn band(&self, index: usize) -> ArrayView2<'_, PixelValue> {
        self.data.index_axis(Axis(2), index)
    }

    /// Whether the profile's extent still matches the data held in memory
    pub fn matches_profile(&self) -> bool {
        self.rows() == self.profile.height && self.cols() == self.profile.width
    }

    /// Render the first band as an 8-bit grayscale PNG preview
    pub fn render_png<P: AsRef<Path>>(&self, path: P) -> RasterResult<()> {
        render::render_band_png(self, path)
    }
}
