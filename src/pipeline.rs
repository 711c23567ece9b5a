//! End-to-end biomass run: load, crop, NDVI, mask, estimate, render.

use crate::core::{
    compute_ndvi, extract_forest_mask, into_quadrant, BiomassEstimate, BiomassEstimator,
    BiomassModel, DEFAULT_FOREST_THRESHOLD,
};
use crate::io::RasterLoader;
use crate::render::{show_figure, FigureConfig, FigureInputs, FigureRenderer};
use crate::types::{
    BandGrid, BiomassError, BiomassResult, BiomassStatistics, ForestMask, PixelSize, Quadrant,
    VisualGrid,
};
use ndarray::Array2;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Default figure output path
pub const DEFAULT_OUTPUT: &str = "result.png";

/// Settings for one biomass run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 3-band true colour image
    pub tci_path: PathBuf,
    /// Red band (Sentinel-2 B04)
    pub red_path: PathBuf,
    /// Near infrared band (Sentinel-2 B08)
    pub nir_path: PathBuf,
    pub output_path: PathBuf,
    pub quadrant: Quadrant,
    /// NDVI value above which a pixel is forest
    pub threshold: f32,
    pub model: BiomassModel,
    pub figure: FigureConfig,
    /// Optional JSON copy of the statistics summary
    pub stats_json: Option<PathBuf>,
    /// Open the saved figure in the system viewer
    pub show: bool,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(tci_path: P, red_path: P, nir_path: P) -> Self {
        Self {
            tci_path: tci_path.into(),
            red_path: red_path.into(),
            nir_path: nir_path.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            quadrant: Quadrant::Full,
            threshold: DEFAULT_FOREST_THRESHOLD,
            model: BiomassModel::default(),
            figure: FigureConfig::default(),
            stats_json: None,
            show: true,
        }
    }
}

/// Everything computed for the selected tile
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pixel_size: PixelSize,
    pub quadrant: Quadrant,
    pub visual: VisualGrid,
    pub red: BandGrid,
    pub nir: BandGrid,
    pub ndvi: Array2<f32>,
    pub mask: ForestMask,
    pub estimate: BiomassEstimate,
}

impl PipelineResult {
    pub fn statistics(&self) -> &BiomassStatistics {
        &self.estimate.statistics
    }
}

/// Crop the loaded grids and run the vegetation / biomass computations.
///
/// All three grids are cropped with the same quadrant so they stay aligned.
/// The grids are consumed: for the full raster they move into the result
/// untouched, for a quarter only the selected region is kept.
pub fn analyze(
    visual: VisualGrid,
    red: BandGrid,
    nir: BandGrid,
    pixel_size: PixelSize,
    quadrant: Quadrant,
    threshold: f32,
    model: BiomassModel,
) -> BiomassResult<PipelineResult> {
    log::info!("Tested tile >>> {}", quadrant);

    let visual = into_quadrant(visual, quadrant)?;
    let red = into_quadrant(red, quadrant)?;
    let nir = into_quadrant(nir, quadrant)?;

    let ndvi = compute_ndvi(&red, &nir)?;
    let mask = extract_forest_mask(&ndvi, threshold);
    let estimate = BiomassEstimator::with_model(model).estimate(&ndvi, &mask, pixel_size)?;

    Ok(PipelineResult {
        pixel_size,
        quadrant,
        visual,
        red,
        nir,
        ndvi,
        mask,
        estimate,
    })
}

/// Render the result figure and write it to `output_path`
pub fn render_result<P: AsRef<Path>>(
    result: &PipelineResult,
    figure: &FigureConfig,
    output_path: P,
) -> BiomassResult<()> {
    let renderer = FigureRenderer::new(figure.clone());
    let canvas = renderer.render(&FigureInputs {
        visual: &result.visual,
        nir: &result.nir,
        ndvi: &result.ndvi,
        biomass_map: &result.estimate.biomass_map,
        quadrant: result.quadrant,
        statistics: result.statistics(),
    });
    FigureRenderer::save(&canvas, output_path)
}

/// Write the statistics summary as pretty-printed JSON
pub fn write_statistics_json<P: AsRef<Path>>(stats: &BiomassStatistics, path: P) -> BiomassResult<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, stats)?;
    log::info!("Statistics written to {}", path.display());
    Ok(())
}

/// Load the inputs named by `config` and compute the statistics for the
/// selected tile. Nothing is written to disk.
pub fn prepare(config: &PipelineConfig) -> BiomassResult<PipelineResult> {
    validate_outputs(config)?;

    let visual = RasterLoader::load_visual(&config.tci_path)?;
    let (red, pixel_size) = RasterLoader::load_band(&config.red_path)?;
    log::info!("Pixel Size >>> {}", pixel_size);
    let (nir, _) = RasterLoader::load_band(&config.nir_path)?;

    if visual.shape()[..2] != red.shape()[..] {
        log::warn!(
            "True colour image {:?} and Red band {:?} differ in size; panels will not align",
            &visual.shape()[..2],
            red.shape()
        );
    }

    analyze(
        visual,
        red,
        nir,
        pixel_size,
        config.quadrant,
        config.threshold,
        config.model,
    )
}

/// Save the figure (and the optional JSON summary) for a prepared result,
/// then open the figure if requested
pub fn publish(result: &PipelineResult, config: &PipelineConfig) -> BiomassResult<()> {
    render_result(result, &config.figure, &config.output_path)?;

    if let Some(json_path) = &config.stats_json {
        write_statistics_json(result.statistics(), json_path)?;
    }

    if config.show {
        show_figure(&config.output_path);
    }

    Ok(())
}

/// Run the full pipeline described by `config`
pub fn run(config: &PipelineConfig) -> BiomassResult<PipelineResult> {
    let result = prepare(config)?;
    publish(&result, config)?;
    Ok(result)
}

/// Ensure the statistics file and figure do not point at the same location
pub fn validate_outputs(config: &PipelineConfig) -> BiomassResult<()> {
    if config.stats_json.as_deref() == Some(config.output_path.as_path()) {
        return Err(BiomassError::InvalidArgument(format!(
            "Statistics JSON and figure would both be written to {}",
            config.output_path.display()
        )));
    }
    Ok(())
}
