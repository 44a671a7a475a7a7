//! Form submission gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────────┐
//!                         │                SUBMISSION GATEWAY                 │
//!                         │                                                   │
//!   POST /api/contact     │  ┌────────┐   ┌──────────┐   ┌────────────────┐   │
//!   POST /api/apply   ────┼─▶│  http  │──▶│ security │──▶│   validation   │   │
//!   POST /api/pre-meeting │  │ server │   │ gate+cors│   │ fields + file  │   │
//!                         │  └────────┘   └──────────┘   └───────┬────────┘   │
//!                         │                                      │            │
//!                         │                                      ▼            │
//!   200 / 4xx / 500       │  ┌──────────┐   ┌───────────┐  ┌────────────┐     │
//!   ◀─────────────────────┼──│ response │◀──│   mail    │◀─│ submission │     │
//!                         │  │ mapping  │   │ (timeout) │  │  compose   │     │
//!                         │  └──────────┘   └─────┬─────┘  └────────────┘     │
//!                         │                       │                           │
//!                         │  config · careers · observability · lifecycle    │
//!                         └───────────────────────┼───────────────────────────┘
//!                                                 ▼
//!                                          Mail provider API
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use submission_gateway::careers::JobRegistry;
use submission_gateway::config::{self, watcher::PositionsWatcher, GatewayConfig};
use submission_gateway::lifecycle::{spawn_signal_handler, Shutdown};
use submission_gateway::observability::{logging, metrics};
use submission_gateway::{mail, GatewayServer};

#[derive(Parser)]
#[command(name = "submission-gateway")]
#[command(about = "Validation and anti-abuse gateway for website forms", long_about = None)]
struct Args {
    /// Path to the TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "submission-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origins = config.cors.allowed_origins.len(),
        mail_provider = ?config.mail.provider,
        "Configuration loaded"
    );

    // Metrics exporter
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Job registry, optionally hot-reloaded
    let registry = Arc::new(JobRegistry::from_config(&config.careers)?);
    tracing::info!(open_positions = registry.snapshot().len(), "Job registry loaded");
    let _watcher = match (&config.careers.positions_file, config.careers.watch) {
        (Some(file), true) => {
            Some(PositionsWatcher::new(Path::new(file), registry.clone()).run()?)
        }
        _ => None,
    };

    let mailer = mail::sender_from_config(&config.mail)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = GatewayServer::new(config, registry, mailer);
    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
