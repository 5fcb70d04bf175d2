//! Pool balancer (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  POOL BALANCER                   │
//!                         │                                                  │
//!     Client Request      │  ┌─────────┐    ┌────────────┐    ┌──────────┐   │
//!     ────────────────────┼─▶│  http   │───▶│ forwarder  │───▶│ selector │   │
//!                         │  │ server  │    │ state loop │◀───│ + health │   │
//!                         │  └─────────┘    └─────┬──────┘    └──────────┘   │
//!                         │                       │ attempt                  │
//!                         │                       ▼                          │
//!     Client Response     │  ┌─────────┐    ┌────────────┐                   │
//!     ◀───────────────────┼──│response │◀───│   client   │◀──────────────────┼──── Endpoint
//!                         │  └─────────┘    └────────────┘                   │
//!                         │                                                  │
//!                         │  config · observability · resilience · lifecycle │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use pool_balancer::config::{read_config, validate_config, ConfigError};
use pool_balancer::lifecycle::startup;
use pool_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "pool-balancer")]
#[command(about = "HTTP load balancer for a fixed pool of backends", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "balancer.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = read_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        endpoints = ?config.endpoints,
        timeout_ms = config.timeout_ms,
        max_retries = config.max_retries,
        performance_routing = config.performance_based_routing,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
