//! Four-panel result figure with colorbars and a statistics table.

use super::colormap::{Colormap, ValueRange};
use super::report::{StatisticsTable, TABLE_HEADERS};
use crate::types::{BandGrid, BiomassError, BiomassResult, BiomassStatistics, Quadrant, VisualGrid};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use ndarray::Array2;
use rusttype::{Font, Scale};
use std::path::{Path, PathBuf};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const HEADER_FILL: Rgb<u8> = Rgb([230, 230, 230]);

/// Fraction of the canvas height reserved for the panel grid; the rest holds the table
const PANEL_AREA_FRACTION: f32 = 0.82;

const PANEL_MARGIN: i32 = 20;
const COLORBAR_GAP: i32 = 10;
const COLORBAR_WIDTH: i32 = 18;
/// Space right of the colorbar for tick and axis labels
const COLORBAR_LABEL_SPACE: i32 = 90;

/// Font locations tried when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Figure rendering configuration
#[derive(Debug, Clone)]
pub struct FigureConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// TrueType font for titles, ticks and the table
    pub font_path: Option<PathBuf>,
    /// Font size for titles and table text
    pub font_size: f32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1200,
            font_path: None,
            font_size: 18.0,
        }
    }
}

/// Cropped grids and statistics to draw
pub struct FigureInputs<'a> {
    pub visual: &'a VisualGrid,
    pub nir: &'a BandGrid,
    pub ndvi: &'a Array2<f32>,
    pub biomass_map: &'a Array2<f32>,
    pub quadrant: Quadrant,
    pub statistics: &'a BiomassStatistics,
}

/// Pixel source of a panel
enum PanelImage<'a> {
    TrueColor(&'a VisualGrid),
    Scalar {
        grid: &'a Array2<f32>,
        colormap: Colormap,
        range: ValueRange,
    },
}

struct Panel<'a> {
    title: String,
    colorbar_label: &'static str,
    image: PanelImage<'a>,
}

/// Composes the result figure
pub struct FigureRenderer {
    config: FigureConfig,
    font: Option<Font<'static>>,
}

impl FigureRenderer {
    /// Create a renderer, loading the configured font or the first system font found
    pub fn new(config: FigureConfig) -> Self {
        let font = load_font(config.font_path.as_deref());
        if font.is_none() {
            log::warn!("No usable TrueType font found, figure text will be omitted");
        }
        Self { config, font }
    }

    /// Render the 2x2 panel grid and the statistics table
    pub fn render(&self, inputs: &FigureInputs) -> RgbImage {
        let tile = inputs.quadrant.label();
        log::info!("Rendering figure for {}", tile);

        let mut canvas = RgbImage::from_pixel(self.config.width, self.config.height, BACKGROUND);

        let panels = [
            Panel {
                title: format!("TCI Image - {}", tile),
                colorbar_label: "RGB",
                image: PanelImage::TrueColor(inputs.visual),
            },
            Panel {
                title: format!("NIR Band - {}", tile),
                colorbar_label: "NIR",
                image: PanelImage::Scalar {
                    grid: inputs.nir,
                    colormap: Colormap::RdYlGn,
                    range: ValueRange::from_data(inputs.nir.iter()),
                },
            },
            Panel {
                title: "NDVI".to_string(),
                colorbar_label: "NDVI",
                image: PanelImage::Scalar {
                    grid: inputs.ndvi,
                    colormap: Colormap::RdYlGn,
                    range: ValueRange::fixed(-1.0, 1.0),
                },
            },
            Panel {
                title: "Estimated Biomass (tons/pixel)".to_string(),
                colorbar_label: "Tons",
                image: PanelImage::Scalar {
                    grid: inputs.biomass_map,
                    colormap: Colormap::Greens,
                    range: ValueRange::from_data(inputs.biomass_map.iter()),
                },
            },
        ];

        let panel_area_height = (self.config.height as f32 * PANEL_AREA_FRACTION) as i32;
        let cell_w = self.config.width as i32 / 2;
        let cell_h = panel_area_height / 2;

        for (i, panel) in panels.iter().enumerate() {
            let cell = Rect::at((i as i32 % 2) * cell_w, (i as i32 / 2) * cell_h)
                .of_size(cell_w.max(1) as u32, cell_h.max(1) as u32);
            self.draw_panel(&mut canvas, cell, panel);
        }

        let table = StatisticsTable::from_statistics(inputs.statistics);
        self.draw_table(&mut canvas, panel_area_height, &table);

        canvas
    }

    /// Write the figure to disk; the format follows the file extension
    pub fn save<P: AsRef<Path>>(canvas: &RgbImage, path: P) -> BiomassResult<()> {
        let path = path.as_ref();
        canvas.save(path).map_err(|e| {
            BiomassError::Render(format!("Failed to save figure to {}: {}", path.display(), e))
        })?;
        log::info!("Figure saved to {}", path.display());
        Ok(())
    }

    fn draw_panel(&self, canvas: &mut RgbImage, cell: Rect, panel: &Panel) {
        let title_h = self.line_height(self.config.font_size);
        self.draw_text_centered(
            canvas,
            &panel.title,
            cell.left() + cell.width() as i32 / 2,
            cell.top() + PANEL_MARGIN / 2,
            self.config.font_size,
        );

        let (rows, cols) = match &panel.image {
            PanelImage::TrueColor(grid) => (grid.shape()[0], grid.shape()[1]),
            PanelImage::Scalar { grid, .. } => grid.dim(),
        };

        let box_w = cell.width() as i32 - 2 * PANEL_MARGIN - COLORBAR_GAP - COLORBAR_WIDTH - COLORBAR_LABEL_SPACE;
        let box_h = cell.height() as i32 - 2 * PANEL_MARGIN - title_h;
        let Some((draw_w, draw_h)) = fit_size(rows, cols, box_w, box_h) else {
            log::warn!("Skipping empty panel '{}'", panel.title);
            return;
        };

        let image_x = cell.left() + PANEL_MARGIN + (box_w - draw_w) / 2;
        let image_y = cell.top() + PANEL_MARGIN + title_h + (box_h - draw_h) / 2;
        let image_rect = Rect::at(image_x, image_y).of_size(draw_w as u32, draw_h as u32);

        match &panel.image {
            PanelImage::TrueColor(grid) => {
                draw_resampled(canvas, image_rect, rows, cols, |r, c| {
                    Rgb([grid[[r, c, 0]], grid[[r, c, 1]], grid[[r, c, 2]]])
                });
                self.draw_colorbar(canvas, image_rect, Colormap::Gray, ValueRange::fixed(0.0, 255.0), panel.colorbar_label);
            }
            PanelImage::Scalar { grid, colormap, range } => {
                draw_resampled(canvas, image_rect, rows, cols, |r, c| {
                    colormap.color_at(range.normalize(grid[[r, c]]))
                });
                self.draw_colorbar(canvas, image_rect, *colormap, *range, panel.colorbar_label);
            }
        }
    }

    fn draw_colorbar(&self, canvas: &mut RgbImage, image_rect: Rect, colormap: Colormap, range: ValueRange, label: &str) {
        let bar_x = image_rect.right() + 1 + COLORBAR_GAP;
        let bar_top = image_rect.top();
        let bar_h = image_rect.height() as i32;

        for dy in 0..bar_h {
            let t = if bar_h > 1 {
                1.0 - dy as f32 / (bar_h - 1) as f32
            } else {
                1.0
            };
            let color = colormap.color_at(t);
            draw_filled_rect_mut(
                canvas,
                Rect::at(bar_x, bar_top + dy).of_size(COLORBAR_WIDTH as u32, 1),
                color,
            );
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(bar_x, bar_top).of_size(COLORBAR_WIDTH as u32, bar_h.max(1) as u32),
            FOREGROUND,
        );

        let tick_size = self.config.font_size * 0.7;
        let tick_x = bar_x + COLORBAR_WIDTH + 4;
        let tick_h = self.line_height(tick_size);
        self.draw_text(canvas, &format_tick(range.max), tick_x, bar_top, tick_size);
        self.draw_text(canvas, &format_tick(range.min), tick_x, bar_top + bar_h - tick_h, tick_size);
        self.draw_text(canvas, label, tick_x, bar_top + bar_h / 2 - tick_h / 2, tick_size);
    }

    fn draw_table(&self, canvas: &mut RgbImage, top: i32, table: &StatisticsTable) {
        let width = self.config.width as i32;
        let height = self.config.height as i32;

        let table_x = (width as f32 * 0.2) as i32;
        let table_w = (width as f32 * 0.65) as i32;
        let label_w = table_w * 2 / 5;
        if label_w <= 0 {
            log::warn!("Canvas too narrow for the statistics table");
            return;
        }
        let row_count = table.rows.len() as i32 + 1;
        let table_top = top + PANEL_MARGIN;
        let row_h = ((height - table_top - PANEL_MARGIN) / row_count).max(1);
        let cell_font_size = (self.config.font_size * 0.8).min(row_h as f32 * 0.7);

        let header = (TABLE_HEADERS[0].to_string(), TABLE_HEADERS[1].to_string());
        for (i, (label, value)) in std::iter::once(&header).chain(table.rows.iter()).enumerate() {
            let y = table_top + i as i32 * row_h;
            let label_cell = Rect::at(table_x, y).of_size(label_w as u32, row_h as u32);
            let value_cell = Rect::at(table_x + label_w, y).of_size((table_w - label_w) as u32, row_h as u32);

            if i == 0 {
                draw_filled_rect_mut(canvas, label_cell, HEADER_FILL);
                draw_filled_rect_mut(canvas, value_cell, HEADER_FILL);
            }
            draw_hollow_rect_mut(canvas, label_cell, FOREGROUND);
            draw_hollow_rect_mut(canvas, value_cell, FOREGROUND);

            let text_y = y + (row_h - self.line_height(cell_font_size)) / 2;
            self.draw_text(canvas, label, table_x + 6, text_y, cell_font_size);
            self.draw_text(canvas, value, table_x + label_w + 6, text_y, cell_font_size);
        }
    }

    fn line_height(&self, size: f32) -> i32 {
        size.ceil() as i32 + 4
    }

    fn draw_text(&self, canvas: &mut RgbImage, text: &str, x: i32, y: i32, size: f32) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, FOREGROUND, x, y, Scale::uniform(size), font, text);
        }
    }

    fn draw_text_centered(&self, canvas: &mut RgbImage, text: &str, center_x: i32, y: i32, size: f32) {
        if let Some(font) = &self.font {
            let (text_w, _) = text_size(Scale::uniform(size), font, text);
            draw_text_mut(canvas, FOREGROUND, center_x - text_w / 2, y, Scale::uniform(size), font, text);
        }
    }
}

fn load_font(configured: Option<&Path>) -> Option<Font<'static>> {
    let candidates: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
    };

    for path in candidates {
        match std::fs::read(&path) {
            Ok(bytes) => match Font::try_from_vec(bytes) {
                Some(font) => {
                    log::debug!("Using font {}", path.display());
                    return Some(font);
                }
                None => log::warn!("{} is not a valid TrueType font", path.display()),
            },
            Err(e) if configured.is_some() => {
                log::warn!("Cannot read font {}: {}", path.display(), e);
            }
            Err(_) => {}
        }
    }
    None
}

/// Largest size with the grid's aspect ratio that fits the box, or `None`
/// when there is nothing to draw
fn fit_size(rows: usize, cols: usize, box_w: i32, box_h: i32) -> Option<(i32, i32)> {
    if rows == 0 || cols == 0 || box_w <= 0 || box_h <= 0 {
        return None;
    }
    let scale = (box_w as f64 / cols as f64).min(box_h as f64 / rows as f64);
    let w = ((cols as f64 * scale).round() as i32).clamp(1, box_w);
    let h = ((rows as f64 * scale).round() as i32).clamp(1, box_h);
    Some((w, h))
}

/// Nearest-neighbour resample of a `rows` x `cols` source into `rect`
fn draw_resampled<F>(canvas: &mut RgbImage, rect: Rect, rows: usize, cols: usize, pixel: F)
where
    F: Fn(usize, usize) -> Rgb<u8>,
{
    let (w, h) = (rect.width() as usize, rect.height() as usize);
    for dy in 0..h {
        let r = (dy * rows / h).min(rows - 1);
        for dx in 0..w {
            let c = (dx * cols / w).min(cols - 1);
            let (x, y) = (rect.left() + dx as i32, rect.top() + dy as i32);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, pixel(r, c));
            }
        }
    }
}

fn format_tick(value: f32) -> String {
    if value != 0.0 && (value.abs() < 0.01 || value.abs() >= 100_000.0) {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_fit_size_preserves_aspect() {
        assert_eq!(fit_size(100, 200, 400, 400), Some((400, 200)));
        assert_eq!(fit_size(10980, 10980, 390, 420), Some((390, 390)));
        assert_eq!(fit_size(0, 10, 400, 400), None);
        assert_eq!(fit_size(10, 10, 0, 400), None);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(-1.0), "-1.00");
        assert_eq!(format_tick(0.0), "0.00");
        assert_eq!(format_tick(0.001), "1.00e-3");
    }

    #[test]
    fn test_resample_fills_rect() {
        let mut canvas = RgbImage::from_pixel(20, 20, BACKGROUND);
        let rect = Rect::at(5, 5).of_size(8, 4);
        let grid = Array3::<u8>::zeros((2, 3, 1));
        draw_resampled(&mut canvas, rect, grid.shape()[0], grid.shape()[1], |_, _| Rgb([1, 2, 3]));

        assert_eq!(*canvas.get_pixel(5, 5), Rgb([1, 2, 3]));
        assert_eq!(*canvas.get_pixel(12, 8), Rgb([1, 2, 3]));
        assert_eq!(*canvas.get_pixel(13, 8), BACKGROUND);
        assert_eq!(*canvas.get_pixel(5, 9), BACKGROUND);
    }

    #[test]
    fn test_true_color_panel_uses_raw_bytes() {
        let visual = Array3::<u8>::from_shape_fn((4, 4, 3), |(_, _, b)| [201, 13, 97][b]);
        let band = Array2::<f32>::from_elem((4, 4), 0.5);
        let stats = BiomassStatistics {
            area_of_one_pixel: 100,
            tile_width_m: 40.0,
            tile_height_m: 40.0,
            tile_area_m2: 1600.0,
            forest_pixels: 16,
            forest_area_km2: 0.0016,
            biomass_tons: 0.161,
        };
        let renderer = FigureRenderer::new(FigureConfig {
            width: 400,
            height: 400,
            ..FigureConfig::default()
        });

        let canvas = renderer.render(&FigureInputs {
            visual: &visual,
            nir: &band,
            ndvi: &band,
            biomass_map: &band,
            quadrant: Quadrant::Full,
            statistics: &stats,
        });

        assert!(canvas.pixels().any(|p| *p == Rgb([201, 13, 97])));
    }
}
