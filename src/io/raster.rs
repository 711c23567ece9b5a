use crate::types::{BandGrid, BiomassError, BiomassResult, PixelSize, VisualGrid};
use gdal::raster::GdalType;
use gdal::Dataset;
use ndarray::{Array2, Array3, Axis};
use std::path::Path;

/// Number of bands in a true colour image
const TCI_BANDS: usize = 3;

/// Sentinel-2 GeoTIFF / JP2 reader
pub struct RasterLoader;

impl RasterLoader {
    /// Read band 1 of a geo-referenced raster (Red or NIR) together with its
    /// ground sample distance
    pub fn load_band<P: AsRef<Path>>(path: P) -> BiomassResult<(BandGrid, PixelSize)> {
        let path = path.as_ref();
        log::info!("Reading band raster from: {}", path.display());

        let dataset = Self::open(path)?;
        let geo_transform = dataset.geo_transform()?;
        log::debug!("Geotransform: {:?}", geo_transform);

        let pixel_size = PixelSize::from_geo_transform(&geo_transform)?;
        let band = Self::read_band::<f32>(&dataset, 1)?;
        log::debug!("Band size: {}x{}", band.ncols(), band.nrows());

        Ok((band, pixel_size))
    }

    /// Read the first three bands of a true colour image into a
    /// rows x cols x channels grid ready for display
    pub fn load_visual<P: AsRef<Path>>(path: P) -> BiomassResult<VisualGrid> {
        let path = path.as_ref();
        log::info!("Reading true colour image from: {}", path.display());

        let dataset = Self::open(path)?;
        let band_count = dataset.raster_count() as usize;
        if band_count < TCI_BANDS {
            return Err(BiomassError::InputAccess {
                path: path.to_path_buf(),
                message: format!("expected {} bands, found {}", TCI_BANDS, band_count),
            });
        }

        let (width, height) = dataset.raster_size();
        let mut visual = Array3::<u8>::zeros((height, width, TCI_BANDS));
        for channel in 0..TCI_BANDS {
            let band = Self::read_band::<u8>(&dataset, channel + 1)?;
            visual.index_axis_mut(Axis(2), channel).assign(&band);
        }
        log::debug!("True colour image size: {}x{}x{}", height, width, TCI_BANDS);

        Ok(visual)
    }

    fn open(path: &Path) -> BiomassResult<Dataset> {
        if !path.exists() {
            return Err(BiomassError::InputAccess {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        Dataset::open(path).map_err(|e| BiomassError::InputAccess {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_band<T: GdalType + Copy>(dataset: &Dataset, index: usize) -> BiomassResult<Array2<T>> {
        let (width, height) = dataset.raster_size();
        let rasterband = dataset.rasterband(index as _)?;
        let band_data = rasterband.read_as::<T>((0, 0), (width, height), (width, height), None)?;

        Array2::from_shape_vec((height, width), band_data.data).map_err(|e| {
            BiomassError::ShapeMismatch(format!("Failed to reshape band {}: {}", index, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdal::raster::Buffer;
    use gdal::DriverManager;

    const UTM_GEO_TRANSFORM: [f64; 6] = [600000.0, 10.0, 0.0, 5000040.0, 0.0, -10.0];

    fn write_geotiff<T: GdalType + Copy>(path: &Path, bands: &[Array2<T>], geo_transform: [f64; 6]) {
        let (rows, cols) = bands[0].dim();
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut dataset = driver
            .create_with_band_type::<T, _>(path, cols as _, rows as _, bands.len() as _)
            .unwrap();
        dataset.set_geo_transform(&geo_transform).unwrap();

        for (i, band) in bands.iter().enumerate() {
            let mut raster_band = dataset.rasterband((i + 1) as _).unwrap();
            let buffer = Buffer::new((cols, rows), band.iter().copied().collect());
            raster_band.write((0, 0), (cols, rows), &buffer).unwrap();
        }
    }

    #[test]
    fn test_load_band_reads_values_and_pixel_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T33_B04.tif");
        let expected = Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as f32 + 0.5);
        write_geotiff(&path, &[expected.clone()], UTM_GEO_TRANSFORM);

        let (band, pixel_size) = RasterLoader::load_band(&path).unwrap();
        assert_eq!(pixel_size, PixelSize { x: 10.0, y: 10.0 });
        assert_eq!(band.dim(), (3, 4));
        assert_eq!(band, expected);
    }

    #[test]
    fn test_load_band_casts_integer_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T33_B08.tif");
        let raw = Array2::from_shape_fn((2, 5), |(r, c)| (1000 + r * 5 + c) as u16);
        write_geotiff(&path, &[raw.clone()], [0.0, 20.0, 0.0, 0.0, 0.0, -20.0]);

        let (band, pixel_size) = RasterLoader::load_band(&path).unwrap();
        assert_eq!(pixel_size.area(), 400.0);
        assert_eq!(band, raw.mapv(f32::from));
    }

    #[test]
    fn test_load_visual_keeps_channel_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T33_TCI.tif");
        let bands: Vec<Array2<u8>> = (0..3)
            .map(|b| Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c + 50 * b) as u8))
            .collect();
        write_geotiff(&path, &bands, UTM_GEO_TRANSFORM);

        let visual = RasterLoader::load_visual(&path).unwrap();
        assert_eq!(visual.dim(), (3, 4, 3));
        for ((r, c, b), &value) in visual.indexed_iter() {
            assert_eq!(value, bands[b][[r, c]], "mismatch at ({}, {}, {})", r, c, b);
        }
    }

    #[test]
    fn test_visual_with_two_bands_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_band.tif");
        let band = Array2::<u8>::zeros((2, 2));
        write_geotiff(&path, &[band.clone(), band], UTM_GEO_TRANSFORM);

        let result = RasterLoader::load_visual(&path);
        assert!(matches!(result, Err(BiomassError::InputAccess { .. })));
    }

    #[test]
    fn test_missing_band_is_input_access_error() {
        let result = RasterLoader::load_band("/nonexistent/T33_B04.jp2");
        assert!(matches!(result, Err(BiomassError::InputAccess { .. })));
    }

    #[test]
    fn test_missing_visual_is_input_access_error() {
        let result = RasterLoader::load_visual("/nonexistent/T33_TCI.jp2");
        assert!(matches!(result, Err(BiomassError::InputAccess { .. })));
    }

    #[test]
    fn test_non_raster_file_is_input_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.tif");
        std::fs::write(&path, b"this is not a raster").unwrap();

        let result = RasterLoader::load_band(&path);
        assert!(matches!(result, Err(BiomassError::InputAccess { .. })));
    }
}
