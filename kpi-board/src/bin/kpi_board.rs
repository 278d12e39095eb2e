/// KPI Board TUI
///
/// Nine threshold-colored KPI tiles read from a spreadsheet range, a scrolling
/// ticker of the marquee feeds, feed filters and a sync status line.
///
/// Keys: r refresh, 1-5 toggle feeds, Enter sales drill-down, q / Esc quit.
use std::{
    error::Error,
    fs::OpenOptions,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kpi_board::{
    render_board, render_drill_down, FeedKey, SheetSource, SheetsClient, SheetsConfig,
    SyncController,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Requests from the UI loop to the task owning the controller
#[derive(Debug, Clone, Copy)]
enum Command {
    Refresh,
    ToggleFeed(FeedKey),
}

/// Get log file path from KPI_BOARD_LOG env var (default: kpi-board.log)
fn get_log_path() -> String {
    std::env::var("KPI_BOARD_LOG").unwrap_or_else(|_| "kpi-board.log".to_string())
}

/// Log to a file; the terminal belongs to the board
fn init_logging() -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(get_log_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

/// Run the controller on its own task. Commands are handled one at a time, so
/// a refresh requested mid-sync runs after the current one (last write wins).
fn spawn_controller<S: SheetSource + 'static>(
    mut controller: SyncController<S>,
    mut command_rx: mpsc::Receiver<Command>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        // Failures are recorded in the published state
        let _ = controller.mount().await;

        while let Some(command) = command_rx.recv().await {
            debug!(?command, "board command");
            match command {
                Command::Refresh => {
                    let _ = controller.refresh().await;
                }
                Command::ToggleFeed(key) => controller.toggle_feed(key),
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let config = SheetsConfig::from_env()?;
    info!(range = %config.qualified_range(), "starting kpi board");
    let controller = SyncController::new(SheetsClient::new(config)?);
    let snapshot_rx = controller.subscribe();

    let (command_tx, command_rx) = mpsc::channel(16);
    let worker = spawn_controller(controller, command_rx);

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let started = Instant::now();
    let frame_rate = Duration::from_millis(100);
    let mut show_drill_down = false;

    loop {
        let snapshot = snapshot_rx.borrow().clone();
        terminal.draw(|f| {
            render_board(f, f.area(), &snapshot, started.elapsed());
            if show_drill_down {
                if let Some(tile) = snapshot.tiles.iter().find(|t| t.drill_down) {
                    render_drill_down(f, f.area(), tile);
                }
            }
        })?;

        if !event::poll(frame_rate)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let command = match key.code {
            KeyCode::Char('q') => break,
            KeyCode::Esc if show_drill_down => {
                show_drill_down = false;
                None
            }
            KeyCode::Esc => break,
            KeyCode::Enter => {
                show_drill_down = true;
                None
            }
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Char(c @ '1'..='5') => {
                let index = (c as u8 - b'1') as usize;
                Some(Command::ToggleFeed(FeedKey::ALL[index]))
            }
            _ => None,
        };

        if let Some(command) = command {
            if command_tx.send(command).await.is_err() {
                break;
            }
        }
    }

    drop(command_tx);
    worker.abort();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
