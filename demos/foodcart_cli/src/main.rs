// foodcart_cli/src/main.rs

mod cli;
mod commands;
mod render;
mod state;

use crate::cli::Cli;
use crate::state::AppState;
use clap::Parser;
use foodcart::CartError;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
  // Quiet by default so command output stays readable; RUST_LOG overrides.
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();
  init_tracing(cli.json_logs);

  let state = match AppState::build(&cli) {
    Ok(state) => state,
    Err(e) => return report(&e),
  };
  tracing::info!(base_url = %state.config.base_url, session_file = %state.config.session_file.display(), "Client ready.");

  match commands::dispatch(&state, cli.command).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => report(&e),
  }
}

/// Every failure, setup included, ends here: the alert text on stderr and a
/// non-zero exit.
fn report(e: &CartError) -> ExitCode {
  tracing::error!(error = %e, kind = ?e.kind(), "Command failed.");
  eprintln!("Error: {}", e.user_message());
  ExitCode::FAILURE
}
