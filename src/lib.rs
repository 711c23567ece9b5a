//! biomass: forest biomass estimation from Sentinel-2 imagery
//!
//! Computes NDVI from the Red (B04) and NIR (B08) bands, thresholds it into a
//! forest mask and converts NDVI into above-ground biomass with a linear
//! regression model. Results are summarised in a four-panel figure with a
//! statistics table.

pub mod types;
pub mod io;
pub mod core;
pub mod render;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    BandGrid, BiomassError, BiomassResult, BiomassStatistics, ForestMask, PixelSize, Quadrant,
    VisualGrid,
};

pub use io::{RasterLoader, SampleDataFetcher};
pub use pipeline::{analyze, prepare, publish, run, PipelineConfig, PipelineResult};
