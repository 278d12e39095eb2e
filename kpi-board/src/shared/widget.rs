//! Ratatui widgets for the KPI board - 3x3 tile grid, ticker, feed filters, status line

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::sync::{BoardSnapshot, SyncStatus};
use super::types::{FeedKey, TileView};

const C_OK: Color = Color::Rgb(100, 220, 100);
const C_ERR: Color = Color::Rgb(220, 100, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_TICKER_BG: Color = Color::Rgb(13, 42, 72);

/// Blank run between the end of the ticker text and its repeat
const TICKER_GAP: usize = 8;

/// Render the whole board
pub fn render_board(f: &mut Frame, area: Rect, snapshot: &BoardSnapshot, elapsed: Duration) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(9),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_tiles(f, chunks[0], &snapshot.tiles);
    render_ticker(f, chunks[1], snapshot, elapsed);
    render_filters(f, chunks[2], snapshot);
    render_status(f, chunks[3], snapshot);
}

fn render_tiles(f: &mut Frame, area: Rect, tiles: &[TileView]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for (row_index, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(*row_area);

        for (col_index, cell_area) in cols.iter().enumerate() {
            if let Some(tile) = tiles.get(row_index * 3 + col_index) {
                render_tile(f, *cell_area, tile);
            }
        }
    }
}

fn render_tile(f: &mut Frame, area: Rect, tile: &TileView) {
    let (r, g, b) = tile.color.to_rgb();
    let title = if tile.drill_down {
        format!(" {} ↵ ", tile.label.to_uppercase())
    } else {
        format!(" {} ", tile.label.to_uppercase())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM))
        .title_style(Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Center the value vertically inside the colored bar
    let pad = inner.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled(
        tile.formatted_value.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));

    let bar = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Rgb(r, g, b)));
    f.render_widget(bar, inner);
}

fn render_ticker(f: &mut Frame, area: Rect, snapshot: &BoardSnapshot, elapsed: Duration) {
    // No feed text: no ticker at all
    if snapshot.ticker.is_suppressed() {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT))
        .style(Style::default().bg(C_TICKER_BG));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let window = ticker_window(
        &snapshot.ticker.text,
        inner.width as usize,
        elapsed,
        snapshot.ticker.speed_seconds,
    );
    let line = Line::from(Span::styled(
        window,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Paragraph::new(line), inner);
}

fn render_filters(f: &mut Frame, area: Rect, snapshot: &BoardSnapshot) {
    let mut spans = vec![Span::styled(
        "LIVE FEED  ",
        Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
    )];

    for (i, key) in FeedKey::ALL.iter().enumerate() {
        let enabled = snapshot.picks.is_enabled(*key);
        let mark = if enabled { "■" } else { "□" };
        let color = if enabled { C_ACCENT } else { C_DIM };
        spans.push(Span::styled(format!("[{}]", i + 1), Style::default().fg(C_DIM)));
        spans.push(Span::styled(format!("{} {}  ", mark, key), Style::default().fg(color)));
    }

    spans.push(Span::styled("[r] refresh  [q] quit", Style::default().fg(C_DIM)));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(f: &mut Frame, area: Rect, snapshot: &BoardSnapshot) {
    let color = match snapshot.sync.status {
        SyncStatus::Ok => C_OK,
        SyncStatus::Error => C_ERR,
        SyncStatus::Loading => C_ACCENT,
        SyncStatus::Idle => C_DIM,
    };

    let status = Paragraph::new(Line::from(Span::styled(
        snapshot.status_line.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(status, area);
}

/// Render the drill-down overlay for the tile at position 0
pub fn render_drill_down(f: &mut Frame, area: Rect, tile: &TileView) {
    let popup = centered_rect(area, 50, 7);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} • Drill-down ", tile.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Today total: ", Style::default().fg(C_DIM)),
            Span::styled(
                tile.formatted_value.clone(),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("[Esc] close", Style::default().fg(C_DIM))),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        popup,
    );
}

/// Visible slice of a looping ticker.
///
/// One full loop (text plus gap) takes `speed_seconds`; the window is `width`
/// characters wide and wraps around.
pub fn ticker_window(text: &str, width: usize, elapsed: Duration, speed_seconds: f64) -> String {
    if text.is_empty() || width == 0 {
        return String::new();
    }

    let looped: Vec<char> = text
        .chars()
        .chain(std::iter::repeat(' ').take(TICKER_GAP))
        .collect();
    let loop_len = looped.len();

    let progress = if speed_seconds > 0.0 && speed_seconds.is_finite() {
        (elapsed.as_secs_f64() / speed_seconds).fract()
    } else {
        0.0
    };
    let offset = ((progress * loop_len as f64) as usize) % loop_len;

    (0..width).map(|i| looped[(offset + i) % loop_len]).collect()
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::color::TileColor;
    use crate::shared::marquee::{FeedPicks, Ticker};
    use crate::shared::sync::SyncState;
    use ratatui::{backend::TestBackend, Terminal};

    fn snapshot(ticker_text: &str) -> BoardSnapshot {
        let tiles = (0..9)
            .map(|position| TileView {
                position,
                label: if position == 0 { "Sales".to_string() } else { format!("Tile {}", position + 1) },
                formatted_value: if position == 0 { "$1,234".to_string() } else { "—".to_string() },
                color: if position == 0 { TileColor::Hsl { hue: 120.0 } } else { TileColor::NoData },
                drill_down: position == 0,
            })
            .collect();

        BoardSnapshot {
            sync: SyncState::default(),
            status_line: String::new(),
            tiles,
            ticker: Ticker {
                text: ticker_text.to_string(),
                speed_seconds: 40.0,
            },
            picks: FeedPicks::default().with(FeedKey::Social, false),
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_ticker_window_scrolls_and_wraps() {
        // "abcd" + 8 spaces = 12 char loop, 12 seconds per loop = 1 char per second
        assert_eq!(ticker_window("abcd", 4, Duration::ZERO, 12.0), "abcd");
        assert_eq!(ticker_window("abcd", 4, Duration::from_secs(1), 12.0), "bcd ");
        assert_eq!(ticker_window("abcd", 14, Duration::ZERO, 12.0), "abcd        ab");
        // A full loop lands back on the start
        assert_eq!(ticker_window("abcd", 4, Duration::from_secs(12), 12.0), "abcd");
    }

    #[test]
    fn test_ticker_window_degenerate_inputs() {
        assert_eq!(ticker_window("", 10, Duration::from_secs(3), 40.0), "");
        assert_eq!(ticker_window("abc", 0, Duration::from_secs(3), 40.0), "");
        assert_eq!(ticker_window("abc", 3, Duration::from_secs(3), 0.0), "abc");
    }

    #[test]
    fn test_render_board() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let snapshot = snapshot("Patio opens Friday");

        terminal
            .draw(|f| render_board(f, f.area(), &snapshot, Duration::ZERO))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("SALES"));
        assert!(text.contains("$1,234"));
        assert!(text.contains("TILE 9"));
        assert!(text.contains("Patio opens Friday"));
        assert!(text.contains("□ Social"));
        assert!(text.contains("■ News"));
    }

    #[test]
    fn test_suppressed_ticker_is_not_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let snapshot = snapshot("");

        terminal
            .draw(|f| render_board(f, f.area(), &snapshot, Duration::ZERO))
            .unwrap();

        let ticker_row_bg = terminal.backend().buffer()[(50, 27)].bg;
        assert_ne!(ticker_row_bg, C_TICKER_BG);
    }

    #[test]
    fn test_render_drill_down() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let snapshot = snapshot("");

        terminal
            .draw(|f| render_drill_down(f, f.area(), &snapshot.tiles[0]))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Sales • Drill-down"));
        assert!(text.contains("Today total: $1,234"));
    }
}
