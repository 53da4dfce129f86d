//! I/O modules for loading, saving, and reconciling georeferenced rasters

pub mod loader;
pub mod reconcile;
pub mod writer;

// Re-export main types
pub use loader::RasterLoader;
pub use reconcile::reconcile_transform;
pub use writer::{RasterWriter, SaveOptions};
