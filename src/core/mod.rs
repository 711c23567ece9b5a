//! Core processing modules: quadrant cropping, vegetation index, forest mask
//! and biomass estimation

pub mod crop;
pub mod ndvi;
pub mod forest_mask;
pub mod biomass;

// Re-export main types
pub use crop::{crop_quadrant, into_quadrant, quadrant_bounds};
pub use ndvi::{compute_ndvi, NDVI_EPSILON};
pub use forest_mask::{extract_forest_mask, forest_pixel_count, DEFAULT_FOREST_THRESHOLD};
pub use biomass::{BiomassEstimate, BiomassEstimator, BiomassModel};
