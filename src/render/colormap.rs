//! Colour scales for raster panels.

use image::Rgb;

/// ColorBrewer RdYlGn, 11 classes (red = low, green = high)
const RD_YL_GN: [[u8; 3]; 11] = [
    [165, 0, 38],
    [215, 48, 39],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 139],
    [255, 255, 191],
    [217, 239, 139],
    [166, 217, 106],
    [102, 189, 99],
    [26, 152, 80],
    [0, 104, 55],
];

/// ColorBrewer Greens, 9 classes (light = low, dark = high)
const GREENS: [[u8; 3]; 9] = [
    [247, 252, 245],
    [229, 245, 224],
    [199, 233, 192],
    [161, 217, 155],
    [116, 196, 118],
    [65, 171, 93],
    [35, 139, 69],
    [0, 109, 44],
    [0, 68, 27],
];

const GRAY: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

/// Colour used for NaN / no-data pixels
pub const NO_DATA_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Named colour scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Diverging red-yellow-green, used for NIR and NDVI
    RdYlGn,
    /// Sequential greens, used for biomass
    Greens,
    /// Linear grey ramp
    Gray,
}

impl Colormap {
    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            Colormap::RdYlGn => &RD_YL_GN,
            Colormap::Greens => &GREENS,
            Colormap::Gray => &GRAY,
        }
    }

    /// Colour at normalized position `t` (0 = low end, 1 = high end)
    pub fn color_at(&self, t: f32) -> Rgb<u8> {
        if t.is_nan() {
            return NO_DATA_COLOR;
        }

        let stops = self.stops();
        let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        interpolate_color(stops[lower], stops[lower + 1], scaled - lower as f32)
    }
}

fn interpolate_color(color1: [u8; 3], color2: [u8; 3], t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let channel = |i: usize| (color1[i] as f32 * t_inv + color2[i] as f32 * t).round() as u8;

    Rgb([channel(0), channel(1), channel(2)])
}

/// Data range mapped onto a colour scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn fixed(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range spanned by the finite values; `0..1` when there are none
    pub fn from_data<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a f32>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            Self::fixed(0.0, 1.0)
        } else {
            Self::fixed(min, max)
        }
    }

    /// Position of `value` within the range, clamped to [0, 1]
    pub fn normalize(&self, value: f32) -> f32 {
        if value.is_nan() {
            return f32::NAN;
        }
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(Colormap::RdYlGn.color_at(0.0), Rgb([165, 0, 38]));
        assert_eq!(Colormap::RdYlGn.color_at(1.0), Rgb([0, 104, 55]));
        assert_eq!(Colormap::RdYlGn.color_at(0.5), Rgb([255, 255, 191]));
        assert_eq!(Colormap::Greens.color_at(1.0), Rgb([0, 68, 27]));
        assert_eq!(Colormap::Gray.color_at(0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(Colormap::Greens.color_at(-3.0), Colormap::Greens.color_at(0.0));
        assert_eq!(Colormap::Greens.color_at(7.0), Colormap::Greens.color_at(1.0));
        assert_eq!(Colormap::Greens.color_at(f32::NAN), NO_DATA_COLOR);
    }

    #[test]
    fn test_value_range_from_data() {
        let values = [3.0, f32::NAN, -2.0, 8.0, f32::INFINITY];
        let range = ValueRange::from_data(values.iter());
        assert_eq!(range, ValueRange::fixed(-2.0, 8.0));
        assert_eq!(range.normalize(3.0), 0.5);
        assert_eq!(range.normalize(100.0), 1.0);

        let empty: [f32; 0] = [];
        assert_eq!(ValueRange::from_data(empty.iter()), ValueRange::fixed(0.0, 1.0));
    }

    #[test]
    fn test_degenerate_range() {
        let flat = ValueRange::fixed(0.01, 0.01);
        assert_eq!(flat.normalize(0.01), 0.0);
    }
}
