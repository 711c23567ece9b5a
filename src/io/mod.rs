//! Raster input and sample data retrieval

pub mod raster;
pub mod sample_data;

pub use raster::RasterLoader;
pub use sample_data::{extract_and_remove, extract_archive, SampleDataFetcher};
