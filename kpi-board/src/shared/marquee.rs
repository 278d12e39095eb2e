//! Ticker composition from the marquee feeds
//!
//! Feeds are filtered by the viewer's picks, joined in fixed order, and scrolled
//! at a speed the sheet editor controls from G12.

use serde::Serialize;
use serde_json::Value;

use super::layout::DEFAULT_SPEED_CONTROL;
use super::types::{FeedKey, MarqueeFeeds};

/// Placed between feed texts
pub const FEED_SEPARATOR: &str = "   •   ";

pub const SPEED_CONTROL_MIN: f64 = 1.0;
pub const SPEED_CONTROL_MAX: f64 = 100.0;

/// Loop duration at control 1 (fastest)
pub const SPEED_SECONDS_FAST: f64 = 40.0;
/// Loop duration at control 100 (slowest)
pub const SPEED_SECONDS_SLOW: f64 = 140.0;

/// Which feeds the viewer wants on the ticker. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedPicks {
    enabled: [bool; 5],
}

impl Default for FeedPicks {
    fn default() -> Self {
        Self { enabled: [true; 5] }
    }
}

impl FeedPicks {
    pub fn is_enabled(&self, key: FeedKey) -> bool {
        self.enabled[key.index()]
    }

    pub fn set(&mut self, key: FeedKey, enabled: bool) {
        self.enabled[key.index()] = enabled;
    }

    pub fn toggle(&mut self, key: FeedKey) {
        self.enabled[key.index()] = !self.enabled[key.index()];
    }

    pub fn with(mut self, key: FeedKey, enabled: bool) -> Self {
        self.set(key, enabled);
        self
    }
}

/// Composed ticker line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    /// Joined feed text; empty when every feed is off or blank
    pub text: String,
    /// Seconds for one full scroll loop (lower = faster)
    pub speed_seconds: f64,
}

impl Ticker {
    /// Nothing to scroll, the sink should hide the ticker entirely
    pub fn is_suppressed(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self {
            text: String::new(),
            speed_seconds: speed_seconds(&Value::Null),
        }
    }
}

/// Compose the ticker from `feeds` filtered by `picks`
pub fn compose(feeds: &MarqueeFeeds, picks: &FeedPicks, speed_cell: &Value) -> Ticker {
    let text = FeedKey::ALL
        .iter()
        .filter(|key| picks.is_enabled(**key))
        .map(|key| feeds.get(*key).trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(FEED_SEPARATOR);

    Ticker {
        text,
        speed_seconds: speed_seconds(speed_cell),
    }
}

/// Loop duration for a raw G12 control cell.
///
/// Unparseable or zero controls use the neutral 70; anything else is clamped to
/// 1..=100 and mapped linearly onto 40..=140 seconds.
pub fn speed_seconds(speed_cell: &Value) -> f64 {
    let control = parse_control(speed_cell)
        .filter(|c| *c != 0.0)
        .unwrap_or(DEFAULT_SPEED_CONTROL)
        .clamp(SPEED_CONTROL_MIN, SPEED_CONTROL_MAX);

    let t = (control - SPEED_CONTROL_MIN) / (SPEED_CONTROL_MAX - SPEED_CONTROL_MIN);
    SPEED_SECONDS_FAST + t * (SPEED_SECONDS_SLOW - SPEED_SECONDS_FAST)
}

/// The control is a plain knob: strip everything but digits, `.` and `-`.
/// Parentheses are dropped rather than read as a negative.
fn parse_control(speed_cell: &Value) -> Option<f64> {
    let control = match speed_cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect::<String>()
            .parse()
            .ok(),
        _ => None,
    };
    control.filter(|c: &f64| c.is_finite())
}
