/// KPI Board - Shared Library
///
/// Turns a human-edited spreadsheet range into a typed board of nine KPI tiles
/// plus a scrolling ticker, for the two binaries:
/// - kpi-board: terminal board with manual refresh and feed filters
/// - kpi-snapshot: one-shot fetch printing the board as JSON
///
/// The library includes:
/// - Cell coercion and the fixed sheet layout
/// - Threshold colors, unit formatting and ticker composition
/// - The sync controller and the Sheets values client
/// - Ratatui widgets for the board
pub mod error;
pub mod shared;

pub use error::SyncError;

// Re-export commonly used types for convenience
pub use shared::types::{FeedKey, KpiEntry, MarqueeFeeds, TileView, UnitToken, TILE_COUNT};

pub use shared::cell::{cell_text, parse_number, parse_number_str};
pub use shared::color::{color_for, TileColor};
pub use shared::format::{format_value, NO_VALUE_PLACEHOLDER};
pub use shared::layout::{normalize_rows, RowRole, SheetSnapshot, SHEET_LAYOUT, SHEET_RANGE};
pub use shared::marquee::{compose, speed_seconds, FeedPicks, Ticker};

pub use shared::source::{SheetSource, SheetsClient, SheetsConfig};
pub use shared::sync::{BoardSnapshot, Dashboard, SyncController, SyncState, SyncStatus};

pub use shared::widget::{render_board, render_drill_down, ticker_window};
