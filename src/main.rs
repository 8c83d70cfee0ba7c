//! Loggly Log Adapter Binary

use clap::Parser;
use loggly_adapter::{AdapterRegistry, Result, router, source};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Forward newline-delimited JSON container log records to Loggly
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// File to read records from; stdin when omitted
    #[arg(short, long, env = "LOG_INPUT")]
    input: Option<PathBuf>,

    /// Fallback log filter when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    initialize_tracing(&cli.log_level);

    info!("Starting Loggly adapter v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = AdapterRegistry::new();
    if let Err(e) = router::register(&mut registry) {
        error!("Could not add route: {}", e);
        std::process::exit(1);
    }

    let records = source::open(cli.input.as_deref()).await?;
    registry.pump(records).await?;

    info!("Input exhausted, Loggly adapter stopped");
    Ok(())
}

/// Initialize structured logging
fn initialize_tracing(log_level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
