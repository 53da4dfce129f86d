//! Pixel-level operations used across the detection workflow

use crate::core::raster::WorkingRaster;
use crate::types::PixelValue;
use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::Float;

impl WorkingRaster {
    /// Classify every pixel against `thresh`, in place.
    ///
    /// Pixels below the threshold become `under`, pixels at or above it
    /// become `equal_or_over`. NaN pixels compare false against both tests
    /// and pass through unchanged, which keeps no-data fills intact across
    /// repeated thresholding runs.
    pub fn threshold_map(
        &mut self,
        thresh: PixelValue,
        under: PixelValue,
        equal_or_over: PixelValue,
    ) {
        log::debug!(
            "Thresholding {} pixel(s) at {} -> [{}, {}]",
            self.data.len(),
            thresh,
            under,
            equal_or_over
        );
        self.data.mapv_inplace(|v| {
            if v < thresh {
                under
            } else if v >= thresh {
                equal_or_over
            } else {
                v
            }
        });
    }

    /// `threshold_map` with the conventional mask values 0 and 1
    pub fn threshold_at(&mut self, thresh: PixelValue) {
        self.threshold_map(thresh, 0.0, 1.0);
    }
}

/// Scale values linearly so the minimum maps to 0 and the maximum to 1.
///
/// The input is left untouched; a freshly scaled array is returned. NaN
/// elements are skipped when the extremes are found and stay NaN in the
/// output. A constant input has zero span, so every output value is
/// non-finite; callers that cannot tolerate that must check their input
/// first.
pub fn min_max_scale<S, A, D>(data: &ArrayBase<S, D>) -> Array<A, D>
where
    S: Data<Elem = A>,
    A: Float,
    D: Dimension,
{
    let min = data.fold(A::infinity(), |acc, &v| if v < acc { v } else { acc });
    let max = data.fold(A::neg_infinity(), |acc, &v| if v > acc { v } else { acc });
    let span = max - min;
    data.mapv(|v| (v - min) / span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RasterProfile;
    use approx::assert_relative_eq;
    use ndarray::{arr1, Array2};

    fn raster_from(values: Vec<f32>, cols: usize) -> WorkingRaster {
        let rows = values.len() / cols;
        let band = Array2::from_shape_vec((rows, cols), values).unwrap();
        WorkingRaster::from_band(band, RasterProfile::synthetic(cols, rows, 1))
    }

    #[test]
    fn threshold_at_splits_on_the_boundary() {
        let mut raster = raster_from(vec![0.1, 0.5, 0.9, 0.49], 2);
        raster.threshold_at(0.5);
        let band = raster.band(0);
        assert_eq!(band[[0, 0]], 0.0);
        assert_eq!(band[[0, 1]], 1.0);
        assert_eq!(band[[1, 0]], 1.0);
        assert_eq!(band[[1, 1]], 0.0);
    }

    #[test]
    fn threshold_map_uses_custom_fill_values() {
        let mut raster = raster_from(vec![1.0, 3.0], 2);
        raster.threshold_map(2.0, -5.0, 5.0);
        let band = raster.band(0);
        assert_eq!(band[[0, 0]], -5.0);
        assert_eq!(band[[0, 1]], 5.0);
    }

    #[test]
    fn threshold_leaves_nan_pixels_unchanged() {
        let mut raster = raster_from(vec![f32::NAN, 0.8], 2);
        raster.threshold_at(0.5);
        let band = raster.band(0);
        assert!(band[[0, 0]].is_nan());
        assert_eq!(band[[0, 1]], 1.0);
    }

    #[test]
    fn min_max_scale_maps_extremes_to_unit_range() {
        let values = arr1(&[2.0_f32, 4.0, 6.0, 10.0]);
        let scaled = min_max_scale(&values);
        assert_relative_eq!(scaled[0], 0.0);
        assert_relative_eq!(scaled[1], 0.25);
        assert_relative_eq!(scaled[2], 0.5);
        assert_relative_eq!(scaled[3], 1.0);
    }

    #[test]
    fn min_max_scale_skips_nan_when_finding_extremes() {
        let values = arr1(&[f32::NAN, 2.0, 4.0, 6.0]);
        let scaled = min_max_scale(&values);
        assert!(scaled[0].is_nan());
        assert_relative_eq!(scaled[1], 0.0);
        assert_relative_eq!(scaled[2], 0.5);
        assert_relative_eq!(scaled[3], 1.0);
    }

    #[test]
    fn min_max_scale_accepts_views_and_f64() {
        let grid = Array2::from_shape_vec((2, 2), vec![1.0_f64, 2.0, 3.0, 5.0]).unwrap();
        let scaled = min_max_scale(&grid.view());
        assert_relative_eq!(scaled[[0, 0]], 0.0);
        assert_relative_eq!(scaled[[1, 1]], 1.0);
    }

    #[test]
    fn min_max_scale_of_a_constant_array_is_non_finite() {
        let values = arr1(&[3.0_f32, 3.0, 3.0]);
        let scaled = min_max_scale(&values);
        assert!(scaled.iter().all(|v| !v.is_finite()));
    }
}
