// Library exports for testing and reuse

pub mod binary;
pub mod cli;
pub mod error;
pub mod estimator;
pub mod geotransform;
pub mod io;
pub mod scan;

// Re-export commonly used types
pub use error::{LacunarityError, Result};
pub use estimator::{estimate, lacunarity_in_window, EstimatorOptions, LevelMode, Window};
pub use geotransform::GeoTransform;
pub use io::{read_band, read_band_i64, write_band_f64, RasterMetadata};
pub use scan::{spatial_scan, GlobalScan, SpatialLacunarity};
