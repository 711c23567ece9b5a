use crate::types::{BandGrid, BiomassError, BiomassResult};
use ndarray::{Array2, Zip};

/// Offset added to the denominator so that pixels with both bands at zero
/// (no-data areas) do not divide by zero
pub const NDVI_EPSILON: f32 = 1e-6;

/// Compute the Normalized Difference Vegetation Index
///
/// `ndvi = (nir - red) / (nir + red + eps)`, clipped to [-1, 1].
pub fn compute_ndvi(red: &BandGrid, nir: &BandGrid) -> BiomassResult<Array2<f32>> {
    if red.dim() != nir.dim() {
        return Err(BiomassError::ShapeMismatch(format!(
            "Red band is {}x{} but NIR band is {}x{}; both bands must cover the same grid",
            red.nrows(),
            red.ncols(),
            nir.nrows(),
            nir.ncols()
        )));
    }

    log::info!("Computing NDVI over {}x{} pixels", red.nrows(), red.ncols());

    let mut ndvi = Array2::<f32>::zeros(red.dim());
    Zip::from(&mut ndvi)
        .and(red)
        .and(nir)
        .for_each(|out, &r, &n| {
            *out = ((n - r) / (n + r + NDVI_EPSILON)).clamp(-1.0, 1.0);
        });

    Ok(ndvi)
}
