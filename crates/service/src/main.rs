//! RidersAid service daemon (ridersaidd)

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ridersaid_service::{ServiceConfig, init_logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "ridersaidd")]
#[command(about = "RidersAid emergency profile service")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.config/ridersaid/service.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overrides `http.bind`
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Snapshot file, overrides `store.snapshot_path`
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(bind) = self.bind {
            config.http.bind = bind;
        }
        if let Some(snapshot) = &self.snapshot {
            config.store.snapshot_path = Some(snapshot.clone());
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load_from_path(path).await?,
        None => ServiceConfig::load().await?,
    };
    cli.apply(&mut config);

    init_logging(&config.logging)?;
    config.validate()?;

    info!("Starting RidersAid service v{}", env!("CARGO_PKG_VERSION"));
    ridersaid_service::serve(config).await
}
