use ndarray::{Array2, Array3};
use serde::Serialize;
use std::path::PathBuf;

/// Single-band reflectance grid (rows x columns)
pub type BandGrid = Array2<f32>;

/// 8-bit true colour composite (rows x columns x channels)
pub type VisualGrid = Array3<u8>;

/// Binary forest mask (0 = non-forest, 1 = forest)
pub type ForestMask = Array2<u8>;

/// Ground sample distance of one pixel, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelSize {
    pub x: f64,
    pub y: f64,
}

impl PixelSize {
    /// Build a pixel footprint, discarding the directional sign of each axis
    pub fn new(x: f64, y: f64) -> BiomassResult<Self> {
        let (x, y) = (x.abs(), y.abs());
        if !x.is_finite() || !y.is_finite() || x == 0.0 || y == 0.0 {
            return Err(BiomassError::InvalidArgument(format!(
                "Pixel size must be positive and finite, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    /// Extract the pixel footprint from a GDAL geotransform
    /// (`[origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]`)
    pub fn from_geo_transform(geo_transform: &[f64; 6]) -> BiomassResult<Self> {
        Self::new(geo_transform[1], geo_transform[5])
    }

    /// Area covered by one pixel in m²
    pub fn area(&self) -> f64 {
        self.x * self.y
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X: {} meter,  Y: {} meter", self.x, self.y)
    }
}

/// Image quadrant selected for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Quadrant {
    /// Entire raster
    #[default]
    Full,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Parse the numeric selector used on the command line (0 = full, 1-4 = quadrants)
    pub fn from_index(index: i64) -> BiomassResult<Self> {
        match index {
            0 => Ok(Quadrant::Full),
            1 => Ok(Quadrant::TopLeft),
            2 => Ok(Quadrant::TopRight),
            3 => Ok(Quadrant::BottomLeft),
            4 => Ok(Quadrant::BottomRight),
            other => Err(BiomassError::InvalidArgument(format!(
                "Quarter must be 0 (entire image), 1, 2, 3, or 4; got {}",
                other
            ))),
        }
    }

    /// Numeric selector of this quadrant
    pub fn index(&self) -> u8 {
        match self {
            Quadrant::Full => 0,
            Quadrant::TopLeft => 1,
            Quadrant::TopRight => 2,
            Quadrant::BottomLeft => 3,
            Quadrant::BottomRight => 4,
        }
    }

    /// Human readable tile name used in figure titles
    pub fn label(&self) -> String {
        match self {
            Quadrant::Full => "Full Raster".to_string(),
            q => format!("Quarter {}", q.index()),
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregate results of a biomass estimation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomassStatistics {
    /// Area of one pixel in m², truncated to an integer
    pub area_of_one_pixel: u64,
    /// Width of the analysed tile in meters
    pub tile_width_m: f64,
    /// Height of the analysed tile in meters
    pub tile_height_m: f64,
    /// Area of the analysed tile in m²
    pub tile_area_m2: f64,
    /// Number of pixels classified as forest
    pub forest_pixels: usize,
    /// Forest area in km²
    pub forest_area_km2: f64,
    /// Total estimated biomass in tons
    pub biomass_tons: f64,
}

/// Error types for biomass processing
#[derive(Debug, thiserror::Error)]
pub enum BiomassError {
    #[error("Cannot access raster {}: {message}", path.display())]
    InputAccess { path: PathBuf, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Sample data download failed: {0}")]
    Download(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for biomass operations
pub type BiomassResult<T> = Result<T, BiomassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_from_index() {
        assert_eq!(Quadrant::from_index(0).unwrap(), Quadrant::Full);
        assert_eq!(Quadrant::from_index(1).unwrap(), Quadrant::TopLeft);
        assert_eq!(Quadrant::from_index(2).unwrap(), Quadrant::TopRight);
        assert_eq!(Quadrant::from_index(3).unwrap(), Quadrant::BottomLeft);
        assert_eq!(Quadrant::from_index(4).unwrap(), Quadrant::BottomRight);

        for bad in [5, -1, 42] {
            assert!(matches!(
                Quadrant::from_index(bad),
                Err(BiomassError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_quadrant_labels() {
        assert_eq!(Quadrant::Full.label(), "Full Raster");
        assert_eq!(Quadrant::BottomLeft.label(), "Quarter 3");
        assert_eq!(Quadrant::TopRight.index(), 2);
    }

    #[test]
    fn test_pixel_size_from_geo_transform() {
        let gt = [600000.0, 10.0, 0.0, 5000040.0, 0.0, -10.0];
        let size = PixelSize::from_geo_transform(&gt).unwrap();
        assert_eq!(size, PixelSize { x: 10.0, y: 10.0 });
        assert_eq!(size.area(), 100.0);
    }

    #[test]
    fn test_pixel_size_rejects_zero() {
        assert!(PixelSize::new(0.0, 10.0).is_err());
        assert!(PixelSize::new(10.0, f64::NAN).is_err());
    }
}
