//! Sync lifecycle for one board session
//!
//! The controller owns every piece of derived state. Consumers never read it
//! directly; they hold a `watch` receiver and get a full [`BoardSnapshot`] after
//! each transition, so a half-applied refresh is never observable.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SyncError;

use super::color::color_for;
use super::format::format_value;
use super::layout::{normalize_rows, SheetSnapshot, DEFAULT_SPEED_CONTROL};
use super::marquee::{compose, FeedPicks, Ticker};
use super::source::SheetSource;
use super::types::{is_drill_down, FeedKey, KpiEntry, MarqueeFeeds, TileView, TILE_COUNT};

/// Ingestion lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    Idle,
    Loading,
    Ok,
    Error,
}

/// Sync status plus the bits the status line shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Time of the last successful sync; kept across later failures
    pub last_sync: Option<DateTime<Utc>>,
    /// Set on failure, cleared when a refresh starts
    pub error_message: String,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            status: SyncStatus::Idle,
            last_sync: None,
            error_message: String::new(),
        }
    }
}

impl SyncState {
    /// Single-line status text. Empty while idle.
    pub fn status_line(&self) -> String {
        match self.status {
            SyncStatus::Idle => String::new(),
            SyncStatus::Loading => "Status: Syncing…".to_string(),
            SyncStatus::Ok => {
                let last = self
                    .last_sync
                    .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "—".to_string());
                format!("Status: Live • Last Sync: {} • Data Source Health: OK", last)
            }
            SyncStatus::Error => format!("Status: Error — {}", self.error_message),
        }
    }
}

/// Derived board content, replaced as a whole on every successful sync
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub kpis: [KpiEntry; TILE_COUNT],
    pub feeds: MarqueeFeeds,
    pub speed_cell: Value,
    pub ticker: Ticker,
}

impl Dashboard {
    /// Board shown before the first successful sync
    pub fn placeholder() -> Self {
        Self {
            kpis: std::array::from_fn(KpiEntry::fallback),
            feeds: MarqueeFeeds::default(),
            speed_cell: Value::from(DEFAULT_SPEED_CONTROL),
            ticker: Ticker::default(),
        }
    }

    pub fn from_snapshot(snapshot: SheetSnapshot, picks: &FeedPicks) -> Self {
        let ticker = compose(&snapshot.feeds, picks, &snapshot.speed_cell);
        Self {
            kpis: snapshot.kpis,
            feeds: snapshot.feeds,
            speed_cell: snapshot.speed_cell,
            ticker,
        }
    }

    /// Label, display value and color for every tile, in board order
    pub fn tile_views(&self) -> Vec<TileView> {
        self.kpis
            .iter()
            .enumerate()
            .map(|(position, kpi)| TileView {
                position,
                label: kpi.label.clone(),
                formatted_value: format_value(kpi.value, kpi.unit()),
                color: color_for(kpi.value, kpi.green_at, kpi.red_at),
                drill_down: is_drill_down(position),
            })
            .collect()
    }
}

/// Everything a presentation sink needs, published after every transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub sync: SyncState,
    pub status_line: String,
    pub tiles: Vec<TileView>,
    pub ticker: Ticker,
    pub picks: FeedPicks,
}

/// Owns the sync lifecycle and derived board state for one session
pub struct SyncController<S> {
    source: S,
    state: SyncState,
    dashboard: Dashboard,
    picks: FeedPicks,
    snapshot_tx: watch::Sender<BoardSnapshot>,
}

impl<S: SheetSource> SyncController<S> {
    /// Idle controller with placeholder tiles. Nothing is fetched until
    /// [`mount`](Self::mount) or [`refresh`](Self::refresh).
    pub fn new(source: S) -> Self {
        let state = SyncState::default();
        let dashboard = Dashboard::placeholder();
        let picks = FeedPicks::default();
        let (snapshot_tx, _) = watch::channel(build_snapshot(&state, &dashboard, &picks));

        Self {
            source,
            state,
            dashboard,
            picks,
            snapshot_tx,
        }
    }

    /// Receiver that sees a fresh snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn picks(&self) -> &FeedPicks {
        &self.picks
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        build_snapshot(&self.state, &self.dashboard, &self.picks)
    }

    /// View creation hook: the one automatic refresh
    pub async fn mount(&mut self) -> Result<(), SyncError> {
        debug!("board mounted, running initial sync");
        self.refresh().await
    }

    /// Fetch the range and replace the board.
    ///
    /// On failure the previous board and `last_sync` stay as they were; the
    /// error is recorded in the state and also returned.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        self.begin_refresh();
        let result = self.source.fetch_rows().await;
        self.finish_refresh(result)
    }

    /// Flip a feed on or off and recompose the ticker from the stored feeds
    pub fn toggle_feed(&mut self, key: FeedKey) {
        self.picks.toggle(key);
        self.dashboard.ticker = compose(&self.dashboard.feeds, &self.picks, &self.dashboard.speed_cell);
        debug!(feed = %key, enabled = self.picks.is_enabled(key), "feed toggled");
        self.publish();
    }

    fn begin_refresh(&mut self) {
        self.state.status = SyncStatus::Loading;
        self.state.error_message.clear();
        self.publish();
    }

    fn finish_refresh(&mut self, result: Result<Vec<Vec<Value>>, SyncError>) -> Result<(), SyncError> {
        match result {
            Ok(rows) => {
                let dashboard = Dashboard::from_snapshot(normalize_rows(&rows), &self.picks);
                self.dashboard = dashboard;
                self.state.status = SyncStatus::Ok;
                self.state.last_sync = Some(Utc::now());
                info!(rows = rows.len(), "board synced");
                self.publish();
                Ok(())
            }
            Err(error) => {
                self.state.status = SyncStatus::Error;
                self.state.error_message = error.to_string();
                warn!(%error, "board sync failed");
                self.publish();
                Err(error)
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx
            .send_replace(build_snapshot(&self.state, &self.dashboard, &self.picks));
    }
}

fn build_snapshot(state: &SyncState, dashboard: &Dashboard, picks: &FeedPicks) -> BoardSnapshot {
    BoardSnapshot {
        sync: state.clone(),
        status_line: state.status_line(),
        tiles: dashboard.tile_views(),
        ticker: dashboard.ticker.clone(),
        picks: *picks,
    }
}
