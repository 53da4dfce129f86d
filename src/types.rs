use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Pixel values are promoted to 32-bit floats on load
pub type PixelValue = f32;

/// Single raster band (rows x cols)
pub type BandImage = Array2<PixelValue>;

/// Band-interleaved raster data (rows x cols x bands)
pub type BandStack = Array3<PixelValue>;

/// Pixel data types of the supported GDAL bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl PixelType {
    /// Map a GDAL band type to the matching pixel type
    pub fn from_gdal(data_type: gdal::raster::GdalDataType) -> RasterResult<Self> {
        use gdal::raster::GdalDataType;
        match data_type {
            GdalDataType::UInt8 => Ok(PixelType::UInt8),
            GdalDataType::UInt16 => Ok(PixelType::UInt16),
            GdalDataType::Int16 => Ok(PixelType::Int16),
            GdalDataType::UInt32 => Ok(PixelType::UInt32),
            GdalDataType::Int32 => Ok(PixelType::Int32),
            GdalDataType::Float32 => Ok(PixelType::Float32),
            GdalDataType::Float64 => Ok(PixelType::Float64),
            other => Err(RasterError::InvalidFormat(format!(
                "unsupported band data type: {:?}",
                other
            ))),
        }
    }

    /// GDAL's name for this pixel type
    pub fn gdal_name(&self) -> &'static str {
        match self {
            PixelType::UInt8 => "Byte",
            PixelType::UInt16 => "UInt16",
            PixelType::Int16 => "Int16",
            PixelType::UInt32 => "UInt32",
            PixelType::Int32 => "Int32",
            PixelType::Float32 => "Float32",
            PixelType::Float64 => "Float64",
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gdal_name())
    }
}

/// Affine pixel-to-world transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Identity mapping: world x = column, world y = row
    pub fn identity() -> Self {
        GeoTransform {
            top_left_x: 0.0,
            pixel_width: 1.0,
            rotation_x: 0.0,
            top_left_y: 0.0,
            rotation_y: 0.0,
            pixel_height: 1.0,
        }
    }

    /// Build from GDAL's 6-element coefficient array
    pub fn from_gdal(coefficients: [f64; 6]) -> Self {
        GeoTransform {
            top_left_x: coefficients[0],
            pixel_width: coefficients[1],
            rotation_x: coefficients[2],
            top_left_y: coefficients[3],
            rotation_y: coefficients[4],
            pixel_height: coefficients[5],
        }
    }

    /// Convert back to GDAL's 6-element coefficient array
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map fractional pixel coordinates (col, row) to world coordinates (x, y)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// Inverse transform mapping world coordinates back to (col, row).
    ///
    /// Returns `None` when the transform is singular (zero-area pixels).
    pub fn invert(&self) -> Option<GeoTransform> {
        let det = self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y;
        if det == 0.0 {
            return None;
        }
        Some(GeoTransform {
            top_left_x: (self.rotation_x * self.top_left_y - self.pixel_height * self.top_left_x)
                / det,
            pixel_width: self.pixel_height / det,
            rotation_x: -self.rotation_x / det,
            top_left_y: (self.rotation_y * self.top_left_x - self.pixel_width * self.top_left_y)
                / det,
            rotation_y: -self.rotation_y / det,
            pixel_height: self.pixel_width / det,
        })
    }

    /// Transform of a sub-window whose upper-left pixel sits at (col_off, row_off)
    pub fn window(&self, col_off: f64, row_off: f64) -> GeoTransform {
        let (top_left_x, top_left_y) = self.apply(col_off, row_off);
        GeoTransform {
            top_left_x,
            top_left_y,
            ..*self
        }
    }
}

/// Georeferencing and layout metadata captured when a raster is loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterProfile {
    /// Raster width in pixels (columns)
    pub width: usize,
    /// Raster height in pixels (rows)
    pub height: usize,
    /// Affine pixel-to-world transform
    pub transform: GeoTransform,
    /// Band count of the source dataset
    pub count: usize,
    /// Pixel type of the source dataset's first band
    pub dtype: PixelType,
    /// Coordinate reference system as WKT, when the source carries one
    pub crs: Option<String>,
    /// No-data marker of the source dataset's first band
    pub nodata: Option<f64>,
    /// Short name of the GDAL driver that served the source
    pub driver: String,
}

impl RasterProfile {
    /// Profile for rasters synthesized in memory rather than loaded from disk
    pub fn synthetic(width: usize, height: usize, count: usize) -> Self {
        RasterProfile {
            width,
            height,
            transform: GeoTransform::identity(),
            count,
            dtype: PixelType::Float32,
            crs: None,
            nodata: None,
            driver: "GTiff".to_string(),
        }
    }
}

/// Error types for raster handling
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Mask geometry error: {0}")]
    Geometry(String),

    #[error("Label error: {0}")]
    Label(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Rendering error: {0}")]
    Render(#[from] image::ImageError),
}

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn geo_transform_round_trips_through_gdal_coefficients() {
        let coefficients = [653817.0, 40.0, 0.0, 8314387.0, 0.0, -40.0];
        let transform = GeoTransform::from_gdal(coefficients);
        assert_eq!(transform.to_gdal(), coefficients);
    }

    #[test]
    fn apply_maps_pixel_centers_north_up() {
        let transform = GeoTransform::from_gdal([100.0, 10.0, 0.0, 500.0, 0.0, -10.0]);
        let (x, y) = transform.apply(2.0, 3.0);
        assert_relative_eq!(x, 120.0);
        assert_relative_eq!(y, 470.0);
    }

    #[test]
    fn invert_recovers_pixel_coordinates() {
        let transform = GeoTransform::from_gdal([100.0, 10.0, 1.5, 500.0, -0.5, -10.0]);
        let inverse = transform.invert().unwrap();
        let (x, y) = transform.apply(7.0, 11.0);
        let (col, row) = inverse.apply(x, y);
        assert_relative_eq!(col, 7.0, epsilon = 1e-9);
        assert_relative_eq!(row, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let transform = GeoTransform::from_gdal([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(transform.invert().is_none());
    }

    #[test]
    fn window_shifts_the_origin_only() {
        let transform = GeoTransform::from_gdal([100.0, 10.0, 0.0, 500.0, 0.0, -10.0]);
        let window = transform.window(4.0, 2.0);
        assert_relative_eq!(window.top_left_x, 140.0);
        assert_relative_eq!(window.top_left_y, 480.0);
        assert_relative_eq!(window.pixel_width, 10.0);
        assert_relative_eq!(window.pixel_height, -10.0);
    }
}
