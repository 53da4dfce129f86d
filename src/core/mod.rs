//! Core raster container and analysis modules

pub mod evaluate;
pub mod ops;
pub mod raster;
pub mod render;

// Re-export main types
pub use evaluate::precision_recall_curve;
pub use ops::min_max_scale;
pub use raster::WorkingRaster;
pub use render::{render_band_png, render_precision_recall_plot};
