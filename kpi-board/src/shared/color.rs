//! Threshold-driven tile colors
//!
//! A tile's value is placed between its red and green anchors and mapped onto a
//! continuous red (hue 0) → green (hue 120) scale.

use serde::{Serialize, Serializer};

use super::types::{DEFAULT_GREEN_AT, DEFAULT_RED_AT};

/// Hue of a value sitting on (or beyond) its red anchor
pub const HUE_RED: f64 = 0.0;
/// Hue of a value sitting on (or beyond) its green anchor
pub const HUE_GREEN: f64 = 120.0;

pub const SATURATION: f64 = 0.70;
pub const LIGHTNESS: f64 = 0.45;

/// Color of a tile without a value
pub const NO_DATA_RGB: (u8, u8, u8) = (0x5b, 0x5b, 0x5b);

/// Tile background color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileColor {
    /// No value to color
    NoData,
    /// Fixed saturation/lightness, hue in 0..=120
    Hsl { hue: f64 },
}

impl TileColor {
    pub fn hue(&self) -> Option<f64> {
        match self {
            TileColor::NoData => None,
            TileColor::Hsl { hue } => Some(*hue),
        }
    }

    /// CSS form, e.g. `hsl(60, 70%, 45%)`
    pub fn to_css(&self) -> String {
        match self {
            TileColor::NoData => "#5b5b5b".to_string(),
            TileColor::Hsl { hue } => format!(
                "hsl({}, {}%, {}%)",
                hue,
                (SATURATION * 100.0).round(),
                (LIGHTNESS * 100.0).round()
            ),
        }
    }

    /// sRGB triple for sinks without HSL support (terminals)
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            TileColor::NoData => NO_DATA_RGB,
            TileColor::Hsl { hue } => hsl_to_rgb(*hue, SATURATION, LIGHTNESS),
        }
    }
}

impl Serialize for TileColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// Color for `value` given its anchors.
///
/// `green_at` may sit below `red_at` (lower is better). Equal anchors give the
/// midpoint hue. Non-finite anchors fall back to the default anchors.
pub fn color_for(value: Option<f64>, green_at: f64, red_at: f64) -> TileColor {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return TileColor::NoData,
    };

    let green_at = if green_at.is_finite() { green_at } else { DEFAULT_GREEN_AT };
    let red_at = if red_at.is_finite() { red_at } else { DEFAULT_RED_AT };

    let span = green_at - red_at;
    let t = if span == 0.0 { 0.5 } else { (value - red_at) / span };
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };

    TileColor::Hsl {
        hue: HUE_RED + t * (HUE_GREEN - HUE_RED),
    }
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}
