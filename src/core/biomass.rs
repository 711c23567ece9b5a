use super::forest_mask::forest_pixel_count;
use crate::types::{BiomassError, BiomassResult, BiomassStatistics, ForestMask, PixelSize};
use ndarray::{Array2, Zip};

/// Square meters per hectare
const M2_PER_HECTARE: f64 = 10_000.0;

/// Square meters per square kilometer
const M2_PER_KM2: f64 = 1_000_000.0;

/// Linear regression from NDVI to above-ground biomass density (tons/ha)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomassModel {
    pub slope: f32,
    pub intercept: f32,
}

impl Default for BiomassModel {
    fn default() -> Self {
        Self {
            slope: 2.779,
            intercept: -0.383,
        }
    }
}

impl BiomassModel {
    /// Biomass density for a single NDVI value, floored at zero
    pub fn density(&self, ndvi: f32) -> f32 {
        (self.slope * ndvi + self.intercept).max(0.0)
    }

    /// Biomass density for every pixel of an NDVI grid
    pub fn density_grid(&self, ndvi: &Array2<f32>) -> Array2<f32> {
        ndvi.mapv(|v| self.density(v))
    }
}

/// Output of a biomass estimation: aggregate statistics plus the per-pixel map
#[derive(Debug, Clone)]
pub struct BiomassEstimate {
    pub statistics: BiomassStatistics,
    /// Estimated biomass in tons per pixel, zero outside the forest mask
    pub biomass_map: Array2<f32>,
}

/// Biomass estimator
pub struct BiomassEstimator {
    model: BiomassModel,
}

impl BiomassEstimator {
    /// Create an estimator using the default regression coefficients
    pub fn new() -> Self {
        Self {
            model: BiomassModel::default(),
        }
    }

    /// Create an estimator with a custom regression model
    pub fn with_model(model: BiomassModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &BiomassModel {
        &self.model
    }

    /// Estimate forest area and biomass for a tile.
    ///
    /// Density is evaluated on the full NDVI grid and the mask is applied
    /// afterwards, so non-forest pixels contribute nothing to the totals.
    pub fn estimate(
        &self,
        ndvi: &Array2<f32>,
        mask: &ForestMask,
        pixel_size: PixelSize,
    ) -> BiomassResult<BiomassEstimate> {
        if ndvi.dim() != mask.dim() {
            return Err(BiomassError::ShapeMismatch(format!(
                "NDVI grid is {:?} but forest mask is {:?}",
                ndvi.dim(),
                mask.dim()
            )));
        }

        let (height, width) = ndvi.dim();
        let pixel_area = pixel_size.area();
        log::info!(
            "Estimating biomass for {}x{} tile, pixel area {} m²",
            height, width, pixel_area
        );
        log::debug!("Biomass model: {:?}", self.model);

        let forest_pixels = forest_pixel_count(mask);
        let forest_area_km2 = forest_pixels as f64 * pixel_area / M2_PER_KM2;

        // tons/pixel = (tons/ha) x (ha/pixel)
        let hectares_per_pixel = (pixel_area / M2_PER_HECTARE) as f32;
        let mut biomass_map = Array2::<f32>::zeros(ndvi.dim());
        Zip::from(&mut biomass_map)
            .and(ndvi)
            .and(mask)
            .for_each(|out, &v, &m| {
                // NaN (no-data) NDVI must not leak through a zero mask
                *out = if m == 1 {
                    self.model.density(v) * hectares_per_pixel
                } else {
                    0.0
                };
            });

        let biomass_tons: f64 = biomass_map.iter().map(|&t| f64::from(t)).sum();

        let tile_width_m = width as f64 * pixel_size.x;
        let tile_height_m = height as f64 * pixel_size.y;

        let statistics = BiomassStatistics {
            area_of_one_pixel: pixel_area as u64,
            tile_width_m,
            tile_height_m,
            tile_area_m2: tile_width_m * tile_height_m,
            forest_pixels,
            forest_area_km2,
            biomass_tons,
        };

        log::info!(
            "Forest area {:.4} km², total biomass {:.4} tons",
            statistics.forest_area_km2,
            statistics.biomass_tons
        );

        Ok(BiomassEstimate {
            statistics,
            biomass_map,
        })
    }
}

impl Default for BiomassEstimator {
    fn default() -> Self {
        Self::new()
    }
}
