mod app;
mod domain;
mod infra;
mod ui;
mod util;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Logs go to stderr so the table on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match app::run().await {
        Ok(report) => {
            info!(
                "Showed {} of {} priced recipes ({} unpriced, {} diagnostics, prices {:?})",
                report.shown,
                report.evaluated,
                report.skipped,
                report.diagnostics,
                report.origin
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
