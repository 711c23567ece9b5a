use crate::types::ForestMask;
use ndarray::Array2;

/// Default NDVI threshold above which a pixel counts as forest
pub const DEFAULT_FOREST_THRESHOLD: f32 = 0.4;

/// Classify pixels as forest (1) where NDVI strictly exceeds `threshold`, else 0.
///
/// The threshold is not range checked: values above 1 give an empty mask and
/// values below -1 mark every pixel.
pub fn extract_forest_mask(ndvi: &Array2<f32>, threshold: f32) -> ForestMask {
    let mask = ndvi.mapv(|v| u8::from(v > threshold));
    log::info!(
        "Forest mask at threshold {}: {} of {} pixels",
        threshold,
        forest_pixel_count(&mask),
        mask.len()
    );
    mask
}

/// Number of forest pixels in a mask
pub fn forest_pixel_count(mask: &ForestMask) -> usize {
    mask.iter().filter(|&&m| m == 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Array2<f32> {
        // -1.0 ..= 1.0 in steps of 0.1
        Array2::from_shape_fn((3, 7), |(r, c)| -1.0 + (r * 7 + c) as f32 * 0.1)
    }

    #[test]
    fn test_mask_is_binary() {
        for threshold in [-2.0, -0.5, 0.0, 0.4, 0.99, 1.0, 3.0] {
            let mask = extract_forest_mask(&ramp(), threshold);
            assert!(mask.iter().all(|&m| m == 0 || m == 1));
        }
    }

    #[test]
    fn test_threshold_extremes() {
        let ndvi = ramp().mapv(|v| v.clamp(-1.0, 1.0));
        assert_eq!(forest_pixel_count(&extract_forest_mask(&ndvi, 1.0)), 0);
        assert_eq!(forest_pixel_count(&extract_forest_mask(&ndvi, 1.5)), 0);
        assert_eq!(
            forest_pixel_count(&extract_forest_mask(&ndvi, -1.01)),
            ndvi.len()
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let ndvi = Array2::from_elem((2, 2), 0.4f32);
        assert_eq!(forest_pixel_count(&extract_forest_mask(&ndvi, 0.4)), 0);
        assert_eq!(forest_pixel_count(&extract_forest_mask(&ndvi, 0.39)), 4);
    }
}
