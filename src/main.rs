mod blog;
mod cache;
mod cli;
mod client;
mod config;
mod content;
mod error;
mod html;
mod server;
mod util;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  #[cfg(unix)]
  {
    tokio::spawn(async {
      if let Err(e) = signal_handler().await {
        tracing::error!("signal handler failed: {e}");
      }
    });
  }

  let cli = cli::Cli::parse();
  cli.run().await
}

#[cfg(unix)]
async fn signal_handler() -> error::Result<()> {
  use tokio::signal::unix::{SignalKind, signal};
  use tracing::info;

  let mut sigint = signal(SignalKind::interrupt())?;
  let mut sigterm = signal(SignalKind::terminate())?;

  tokio::select! {
    _ = sigint.recv() => {
      info!("Received SIGINT, shutting down...");
    }
    _ = sigterm.recv() => {
      info!("Received SIGTERM, shutting down...");
    }
  };

  std::process::exit(0)
}
