/// Core data types for the KPI board
///
/// These types are the typed model built from the spreadsheet range and the
/// value objects handed to whatever renders the board.

use serde::Serialize;

use super::color::TileColor;

/// Number of KPI tiles on the board
pub const TILE_COUNT: usize = 9;

/// Default "fully green" anchor when the sheet leaves column C blank
pub const DEFAULT_GREEN_AT: f64 = 100.0;

/// Default "fully red" anchor when the sheet leaves column D blank
pub const DEFAULT_RED_AT: f64 = 0.0;

/// Display unit of a tile value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnitToken {
    Currency,
    Percent,
    #[default]
    Plain,
}

impl UnitToken {
    /// Interpret a unit cell (case-insensitive, surrounding whitespace ignored)
    pub fn parse(raw: &str) -> Self {
        let unit = raw.trim().to_lowercase();
        match unit.as_str() {
            "$" | "usd" | "dollar" => UnitToken::Currency,
            "%" => UnitToken::Percent,
            _ => UnitToken::Plain,
        }
    }
}

/// One KPI as read from its sheet row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiEntry {
    /// Tile caption (column A, or "Tile N" when blank)
    pub label: String,
    /// Current value (column B); `None` = absent or unparseable
    pub value: Option<f64>,
    /// Value at which the tile is fully green (column C)
    pub green_at: f64,
    /// Value at which the tile is fully red (column D)
    pub red_at: f64,
    /// Unit cell text exactly as typed, trimmed (column F)
    pub unit_raw: String,
}

impl KpiEntry {
    /// Placeholder entry shown before the first successful sync
    pub fn fallback(position: usize) -> Self {
        Self {
            label: fallback_label(position),
            value: None,
            green_at: DEFAULT_GREEN_AT,
            red_at: DEFAULT_RED_AT,
            unit_raw: String::new(),
        }
    }

    pub fn unit(&self) -> UnitToken {
        UnitToken::parse(&self.unit_raw)
    }
}

/// Caption used for a tile whose label cell is blank
pub fn fallback_label(position: usize) -> String {
    format!("Tile {}", position + 1)
}

/// Position 0 opens the sales drill-down
pub fn is_drill_down(position: usize) -> bool {
    position == 0
}

/// Marquee text feeds, in ticker order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeedKey {
    Questions,
    Reviews,
    Banking,
    Social,
    News,
}

impl FeedKey {
    /// Every feed in the fixed order the ticker joins them
    pub const ALL: [FeedKey; 5] = [
        FeedKey::Questions,
        FeedKey::Reviews,
        FeedKey::Banking,
        FeedKey::Social,
        FeedKey::News,
    ];

    pub fn index(&self) -> usize {
        match self {
            FeedKey::Questions => 0,
            FeedKey::Reviews => 1,
            FeedKey::Banking => 2,
            FeedKey::Social => 3,
            FeedKey::News => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKey::Questions => "Questions",
            FeedKey::Reviews => "Reviews",
            FeedKey::Banking => "Banking",
            FeedKey::Social => "Social",
            FeedKey::News => "News",
        }
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw marquee text per feed. Missing rows are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarqueeFeeds {
    texts: [String; 5],
}

impl MarqueeFeeds {
    pub fn get(&self, key: FeedKey) -> &str {
        &self.texts[key.index()]
    }

    pub fn set(&mut self, key: FeedKey, text: impl Into<String>) {
        self.texts[key.index()] = text.into();
    }

    pub fn with(mut self, key: FeedKey, text: impl Into<String>) -> Self {
        self.set(key, text);
        self
    }
}

/// What a sink needs to draw one tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub position: usize,
    pub label: String,
    pub formatted_value: String,
    pub color: TileColor,
    pub drill_down: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_token_parse() {
        assert_eq!(UnitToken::parse("$"), UnitToken::Currency);
        assert_eq!(UnitToken::parse(" USD "), UnitToken::Currency);
        assert_eq!(UnitToken::parse("Dollar"), UnitToken::Currency);
        assert_eq!(UnitToken::parse("%"), UnitToken::Percent);
        assert_eq!(UnitToken::parse(""), UnitToken::Plain);
        assert_eq!(UnitToken::parse("covers"), UnitToken::Plain);
    }

    #[test]
    fn test_fallback_entry() {
        let entry = KpiEntry::fallback(4);
        assert_eq!(entry.label, "Tile 5");
        assert_eq!(entry.value, None);
        assert_eq!(entry.green_at, DEFAULT_GREEN_AT);
        assert_eq!(entry.red_at, DEFAULT_RED_AT);
        assert_eq!(entry.unit(), UnitToken::Plain);
    }

    #[test]
    fn test_feed_order_matches_index() {
        for (i, key) in FeedKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn test_marquee_feeds_default_empty() {
        let feeds = MarqueeFeeds::default().with(FeedKey::News, "Patio opens Friday");
        assert_eq!(feeds.get(FeedKey::News), "Patio opens Friday");
        assert_eq!(feeds.get(FeedKey::Banking), "");
    }
}
