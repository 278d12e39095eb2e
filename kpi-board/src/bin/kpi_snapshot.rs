/// KPI Snapshot
///
/// Syncs the sheet once and prints the board (tiles, ticker, status) as JSON.
/// After printing the board it would show, exits 2 when the sheet rejected the
/// request (bad key, unknown tab) and 1 on any other sync failure.
use std::{error::Error, io, process::ExitCode};

use kpi_board::{SheetsClient, SheetsConfig, SyncController};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    init_logging();

    let config = SheetsConfig::from_env()?;
    info!(
        spreadsheet = %config.spreadsheet_id,
        range = %config.qualified_range(),
        "syncing sheet"
    );

    let mut controller = SyncController::new(SheetsClient::new(config)?);
    let result = controller.mount().await;

    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(sync_error) => {
            error!(error = %sync_error, "sync failed");
            Ok(exit_code_for(sync_error.is_rejected()))
        }
    }
}

fn exit_code_for(rejected: bool) -> ExitCode {
    if rejected {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Logs go to stderr so stdout stays valid JSON
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}
