mod api;
mod app;
mod commands;
mod config;
mod error;
mod event;
mod forms;
mod logging;
mod mutation;
mod notify;
mod query;
mod ui;
mod view_state;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "staffdesk")]
#[command(about = "A terminal UI for managing employees and job titles")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/staffdesk/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the REST backend
  #[arg(short = 'u', long, env = "STAFFDESK_API_URL")]
  api_url: Option<String>,

  /// Page to open at startup
  #[arg(long, value_enum)]
  view: Option<config::StartView>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let (mut config, config_path) = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(api_url) = args.api_url {
    config.api.base_url = api_url;
  }
  let start = args.view.unwrap_or(config.ui.default_view);

  // Keep the guard alive so buffered log lines are flushed on exit
  let (_log_guard, log_path) = logging::init(&config.log)?;
  info!(
    config = ?config_path,
    log = %log_path.display(),
    base_url = %config.api.base_url,
    "staffdesk starting"
  );

  // Initialize and run the app
  let mut app = app::App::new(&config, start)?;
  app.run().await?;

  Ok(())
}
