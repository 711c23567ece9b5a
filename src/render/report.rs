//! Statistics table shown under the figure panels and printed to the console.

use crate::types::BiomassStatistics;

const M_PER_KM: f64 = 1_000.0;
const M2_PER_KM2: f64 = 1_000_000.0;

/// Column headers of the statistics table
pub const TABLE_HEADERS: [&str; 2] = ["Statistic", "Values"];

/// Pre-formatted statistics rows
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsTable {
    pub rows: Vec<(String, String)>,
}

impl StatisticsTable {
    pub fn from_statistics(stats: &BiomassStatistics) -> Self {
        let rows = vec![
            (
                "Area_of_one_pixel".to_string(),
                format!("{} m²", format_thousands(stats.area_of_one_pixel)),
            ),
            (
                "Area_of_sliced_tile".to_string(),
                format!(
                    "{:.2} km * {:.2} km = {:.4} km²",
                    stats.tile_width_m / M_PER_KM,
                    stats.tile_height_m / M_PER_KM,
                    stats.tile_area_m2 / M2_PER_KM2
                ),
            ),
            (
                "Detected Forest Area".to_string(),
                format!("{:.2} km²", stats.forest_area_km2),
            ),
            (
                "Total Biomass".to_string(),
                format!("{:.2} tons", stats.biomass_tons),
            ),
        ];

        Self { rows }
    }
}

impl std::fmt::Display for StatisticsTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label_width = self
            .rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .chain(std::iter::once(TABLE_HEADERS[0].len()))
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<width$}  {}", TABLE_HEADERS[0], TABLE_HEADERS[1], width = label_width)?;
        for (label, value) in &self.rows {
            writeln!(f, "{:<width$}  {}", label, value, width = label_width)?;
        }
        Ok(())
    }
}

/// Integer with comma thousands separators (`1234567` -> `1,234,567`)
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinel_tile_stats() -> BiomassStatistics {
        BiomassStatistics {
            area_of_one_pixel: 100,
            tile_width_m: 54_900.0,
            tile_height_m: 54_900.0,
            tile_area_m2: 54_900.0 * 54_900.0,
            forest_pixels: 12_345_678,
            forest_area_km2: 1_234.5678,
            biomass_tons: 9_876_543.219,
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(100), "100");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_table_rows() {
        let table = StatisticsTable::from_statistics(&sentinel_tile_stats());
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].1, "100 m²");
        assert_eq!(table.rows[1].1, "54.90 km * 54.90 km = 3014.0100 km²");
        assert_eq!(table.rows[2].1, "1234.57 km²");
        assert_eq!(table.rows[3].1, "9876543.22 tons");
    }

    #[test]
    fn test_small_values_keep_two_decimals() {
        let stats = BiomassStatistics {
            area_of_one_pixel: 100,
            tile_width_m: 40.0,
            tile_height_m: 40.0,
            tile_area_m2: 1600.0,
            forest_pixels: 16,
            forest_area_km2: 0.0016,
            biomass_tons: 0.16104,
        };
        let table = StatisticsTable::from_statistics(&stats);
        assert_eq!(table.rows[1].1, "0.04 km * 0.04 km = 0.0016 km²");
        assert_eq!(table.rows[2].1, "0.00 km²");
        assert_eq!(table.rows[3].1, "0.16 tons");
    }

    #[test]
    fn test_plain_text_output() {
        let text = StatisticsTable::from_statistics(&sentinel_tile_stats()).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Statistic"));
        assert!(lines[4].starts_with("Total Biomass"));
        assert!(lines[4].ends_with("tons"));
    }
}
