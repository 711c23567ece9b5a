//! Estimate forest biomass from Sentinel-2 imagery.
//!
//! Usage:
//!   biomass --tci T33_TCI.jp2 --red T33_B04.jp2 --nir T33_B08.jp2
//!   biomass --tci ... --red ... --nir ... --quarter 2 --threshold 0.5 --save-img q2.png

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use biomass::core::{BiomassModel, DEFAULT_FOREST_THRESHOLD};
use biomass::pipeline::{self, PipelineConfig, DEFAULT_OUTPUT};
use biomass::render::{FigureConfig, StatisticsTable};
use biomass::{Quadrant, SampleDataFetcher};

#[derive(Parser, Debug)]
#[command(name = "biomass")]
#[command(about = "Estimate biomass from Sentinel-2 imagery.")]
struct Args {
    /// Path to TCI (3-band RGB) image
    #[arg(long)]
    tci: PathBuf,

    /// Path to Red band (Band 4) image
    #[arg(long)]
    red: PathBuf,

    /// Path to NIR band (Band 8) image
    #[arg(long)]
    nir: PathBuf,

    /// Path to save result image
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    save_img: PathBuf,

    /// Quarter to slice (0 = entire image, 1~4 for sliced tiles)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    quarter: i64,

    /// NDVI threshold for forest region masking
    #[arg(long, default_value_t = DEFAULT_FOREST_THRESHOLD, allow_negative_numbers = true)]
    threshold: f32,

    /// Also write the statistics summary as JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// TrueType font used for figure text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Skip downloading the sample images
    #[arg(long)]
    no_download: bool,

    /// Do not open the saved figure
    #[arg(long)]
    no_show: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    // Reject a bad selector before any download or raster read
    let quadrant = Quadrant::from_index(args.quarter)?;

    if !args.no_download {
        let working_dir = std::env::current_dir().context("Cannot determine working directory")?;
        SampleDataFetcher::new()
            .fetch_and_extract(&working_dir)
            .context("Failed to fetch sample images")?;
    }

    let config = PipelineConfig {
        output_path: args.save_img,
        quadrant,
        threshold: args.threshold,
        model: BiomassModel::default(),
        figure: FigureConfig {
            font_path: args.font,
            ..FigureConfig::default()
        },
        stats_json: args.stats_json,
        show: !args.no_show,
        ..PipelineConfig::new(args.tci, args.red, args.nir)
    };

    let result = pipeline::prepare(&config).context("Biomass estimation failed")?;

    // Statistics are printed before any output file is written
    println!("\n Pixel Size  >>> {}", result.pixel_size);
    println!("\n Tested tile >>>  {}", result.quadrant);
    println!("\n Biomass Calculation  >>> \n");
    print!("{}", StatisticsTable::from_statistics(result.statistics()));

    pipeline::publish(&result, &config).context("Failed to save the result figure")?;
    println!("\n Figure saved to {}", config.output_path.display());

    Ok(())
}
