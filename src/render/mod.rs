//! Result figure: raster panels, colorbars and the statistics table

pub mod colormap;
pub mod display;
pub mod figure;
pub mod report;

pub use colormap::{Colormap, ValueRange};
pub use display::show_figure;
pub use figure::{FigureConfig, FigureInputs, FigureRenderer};
pub use report::StatisticsTable;
