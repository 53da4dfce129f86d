//! floeberg: raster support for SAR iceberg detection
//!
//! This library carries the raster plumbing a detection pipeline needs
//! around its classifier: loading georeferenced scenes (optionally cropped
//! and masked by vector geometries), thresholding and rescaling pixels,
//! scoring detections against reference labels, and writing results back
//! out as GeoTIFF.

pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    BandImage, BandStack, GeoTransform, PixelType, PixelValue, RasterError, RasterProfile,
    RasterResult,
};

pub use crate::core::{
    min_max_scale, precision_recall_curve, render_band_png, render_precision_recall_plot,
    WorkingRaster,
};

pub use io::{reconcile_transform, RasterLoader, RasterWriter, SaveOptions};

#[cfg(feature = "python")]
mod python {
    //! Python bindings exposed as the `_core` extension module

    use crate::core::{min_max_scale, precision_recall_curve, WorkingRaster};
    use crate::io::{reconcile_transform, RasterLoader, RasterWriter, SaveOptions};
    use crate::types::RasterError;
    use gdal::vector::Geometry;
    use numpy::{IntoPyArray, PyArray3, PyArrayDyn, PyReadonlyArrayDyn, ToPyArray};
    use pyo3::prelude::*;
    use std::path::Path;

    fn runtime_error(e: RasterError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
    }

    fn value_error(message: String) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(message)
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_class::<PyWorkingRaster>()?;
        m.add_function(wrap_pyfunction!(py_min_max_scale, m)?)?;
        m.add_function(wrap_pyfunction!(py_precision_recall_curve, m)?)?;
        m.add_function(wrap_pyfunction!(py_reconcile_transform, m)?)?;
        Ok(())
    }

    /// Python wrapper for WorkingRaster
    #[pyclass(name = "WorkingRaster")]
    struct PyWorkingRaster {
        inner: WorkingRaster,
    }

    #[pymethods]
    impl PyWorkingRaster {
        /// Load a raster, optionally cropped and masked by WKT geometries
        #[staticmethod]
        #[pyo3(signature = (filename, mask=None))]
        fn load(filename: String, mask: Option<Vec<String>>) -> PyResult<Self> {
            let inner = match mask {
                Some(wkts) => {
                    let geometries = wkts
                        .iter()
                        .map(|wkt| Geometry::from_wkt(wkt))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| value_error(format!("invalid mask geometry: {}", e)))?;
                    RasterLoader::load_masked(&filename, &geometries).map_err(runtime_error)?
                }
                None => RasterLoader::load(&filename).map_err(runtime_error)?,
            };
            Ok(PyWorkingRaster { inner })
        }

        #[pyo3(signature = (thresh, under=0.0, equal_or_over=1.0))]
        fn threshold_at(&mut self, thresh: f32, under: f32, equal_or_over: f32) {
            self.inner.threshold_map(thresh, under, equal_or_over);
        }

        fn copy(&self) -> Self {
            PyWorkingRaster {
                inner: self.inner.clone(),
            }
        }

        fn quick_save(&self, filename: String) -> PyResult<()> {
            RasterWriter::save(&self.inner, &filename).map_err(runtime_error)
        }

        #[pyo3(signature = (filename, band_index=None, compression=None))]
        fn save(
            &self,
            filename: String,
            band_index: Option<usize>,
            compression: Option<String>,
        ) -> PyResult<()> {
            let options = SaveOptions {
                band_index,
                compression,
            };
            RasterWriter::save_with_options(&self.inner, &filename, &options)
                .map_err(runtime_error)
        }

        fn save_mask(&self, filename: String) -> PyResult<()> {
            RasterWriter::save_mask(&self.inner, &filename).map_err(runtime_error)
        }

        fn show(&self, filename: String) -> PyResult<()> {
            self.inner.render_png(&filename).map_err(runtime_error)
        }

        #[getter]
        fn data<'py>(&self, py: Python<'py>) -> &'py PyArray3<f32> {
            self.inner.data.to_pyarray(py)
        }

        #[getter]
        fn count(&self) -> usize {
            self.inner.source_band_count
        }

        #[getter]
        fn width(&self) -> usize {
            self.inner.profile.width
        }

        #[getter]
        fn height(&self) -> usize {
            self.inner.profile.height
        }

        #[getter]
        fn source(&self) -> Option<String> {
            self.inner
                .source
                .as_ref()
                .map(|path| path.display().to_string())
        }

        fn __repr__(&self) -> String {
            format!(
                "WorkingRaster({}x{}x{}, dtype={})",
                self.inner.rows(),
                self.inner.cols(),
                self.inner.band_count(),
                self.inner.profile.dtype
            )
        }
    }

    /// Scale an array linearly onto 0..1
    #[pyfunction]
    #[pyo3(name = "min_max_scale")]
    fn py_min_max_scale<'py>(
        py: Python<'py>,
        data: PyReadonlyArrayDyn<'py, f32>,
    ) -> &'py PyArrayDyn<f32> {
        min_max_scale(&data.as_array()).into_pyarray(py)
    }

    /// Precision and recall per threshold, with an optional PNG plot
    #[pyfunction]
    #[pyo3(name = "precision_recall_curve")]
    #[pyo3(signature = (y_true, pred_scores, thresholds, plot=None))]
    fn py_precision_recall_curve(
        y_true: Vec<u8>,
        pred_scores: Vec<f32>,
        thresholds: Vec<f32>,
        plot: Option<String>,
    ) -> PyResult<(Vec<f64>, Vec<f64>)> {
        precision_recall_curve(
            &y_true,
            &pred_scores,
            &thresholds,
            plot.as_deref().map(Path::new),
        )
        .map_err(|e| match e {
            RasterError::Label(message) => value_error(message),
            other => runtime_error(other),
        })
    }

    /// Stamp the reference raster's transform onto the target file
    #[pyfunction]
    #[pyo3(name = "reconcile_transform")]
    fn py_reconcile_transform(target: String, reference: String) -> PyResult<()> {
        reconcile_transform(&target, &reference).map_err(runtime_error)
    }
}
