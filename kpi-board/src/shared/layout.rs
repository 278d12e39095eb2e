//! Fixed sheet layout and row normalization
//!
//! The sheet range `A2:G17` is read as a grid whose row 0 is sheet row 2.
//! Which row means what lives in one table, [`SHEET_LAYOUT`].

use serde_json::Value;
use tracing::debug;

use super::cell::{cell_at, cell_text, parse_number};
use super::types::{
    fallback_label, FeedKey, KpiEntry, MarqueeFeeds, DEFAULT_GREEN_AT, DEFAULT_RED_AT, TILE_COUNT,
};

/// Range requested from the sheet (relative to the named tab)
pub const SHEET_RANGE: &str = "A2:G17";

pub const COL_LABEL: usize = 0; // A
pub const COL_VALUE: usize = 1; // B
pub const COL_GREEN_AT: usize = 2; // C
pub const COL_RED_AT: usize = 3; // D
pub const COL_UNIT: usize = 5; // F
pub const COL_SPEED: usize = 6; // G

/// Neutral ticker speed control used when G12 is absent
pub const DEFAULT_SPEED_CONTROL: f64 = 70.0;

/// Meaning of a grid row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    /// KPI tile at this board position
    Tile(usize),
    /// Marquee text in column B
    Feed(FeedKey),
}

/// Row offset → role. Rows 11 and 12 (sheet rows 13-14) are unused.
pub const SHEET_LAYOUT: [(usize, RowRole); 14] = [
    (0, RowRole::Tile(0)),
    (1, RowRole::Tile(1)),
    (2, RowRole::Tile(2)),
    (3, RowRole::Tile(3)),
    (4, RowRole::Tile(4)),
    (5, RowRole::Tile(5)),
    (6, RowRole::Feed(FeedKey::Questions)),
    (7, RowRole::Feed(FeedKey::Reviews)),
    (8, RowRole::Tile(6)),
    (9, RowRole::Tile(7)),
    (10, RowRole::Tile(8)),
    (13, RowRole::Feed(FeedKey::Banking)),
    (14, RowRole::Feed(FeedKey::Social)),
    (15, RowRole::Feed(FeedKey::News)),
];

/// Speed control cell (G12)
pub const SPEED_CELL: (usize, usize) = (10, COL_SPEED);

/// Everything read from one fetch of the range
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSnapshot {
    pub kpis: [KpiEntry; TILE_COUNT],
    pub feeds: MarqueeFeeds,
    /// Raw G12 cell, left for the marquee composer to interpret
    pub speed_cell: Value,
}

/// Grid row holding the tile at `position`
pub fn tile_row(position: usize) -> Option<usize> {
    SHEET_LAYOUT
        .iter()
        .find(|(_, role)| *role == RowRole::Tile(position))
        .map(|(row, _)| *row)
}

/// Grid row holding the text for `key`
pub fn feed_row(key: FeedKey) -> Option<usize> {
    SHEET_LAYOUT
        .iter()
        .find(|(_, role)| *role == RowRole::Feed(key))
        .map(|(row, _)| *row)
}

/// Normalize a grid into the nine tiles, five feeds and the speed cell.
///
/// Short or ragged grids degrade field by field to defaults.
pub fn normalize_rows(rows: &[Vec<Value>]) -> SheetSnapshot {
    let kpis = std::array::from_fn(|position| {
        tile_row(position)
            .map(|row| read_kpi(rows, row, position))
            .unwrap_or_else(|| KpiEntry::fallback(position))
    });

    let mut feeds = MarqueeFeeds::default();
    for key in FeedKey::ALL {
        let text = feed_row(key)
            .map(|row| cell_text(cell_at(rows, row, COL_VALUE)))
            .unwrap_or_default();
        feeds.set(key, text);
    }

    let speed_cell = cell_at(rows, SPEED_CELL.0, SPEED_CELL.1)
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| Value::from(DEFAULT_SPEED_CONTROL));

    debug!(rows = rows.len(), "normalized sheet range");

    SheetSnapshot {
        kpis,
        feeds,
        speed_cell,
    }
}

fn read_kpi(rows: &[Vec<Value>], row: usize, position: usize) -> KpiEntry {
    let label = cell_text(cell_at(rows, row, COL_LABEL)).trim().to_string();
    let label = if label.is_empty() {
        fallback_label(position)
    } else {
        label
    };

    KpiEntry {
        label,
        value: parse_number(cell_at(rows, row, COL_VALUE)),
        green_at: parse_number(cell_at(rows, row, COL_GREEN_AT)).unwrap_or(DEFAULT_GREEN_AT),
        red_at: parse_number(cell_at(rows, row, COL_RED_AT)).unwrap_or(DEFAULT_RED_AT),
        unit_raw: cell_text(cell_at(rows, row, COL_UNIT)).trim().to_string(),
    }
}
