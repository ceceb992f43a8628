//! # Schema Mapper
//!
//! Headless schema mapper speaking line-delimited JSON over stdin/stdout.

use clap::Parser;
use mapper_host::{CliArgs, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the event stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "schema_mapper=info,mapper_host=info,mapper_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Schema Mapper v{}", mapper_core::VERSION);

    let args = CliArgs::parse();
    let config = HostConfig::from(args);

    if let Some(ref path) = config.document {
        tracing::info!("Document: {}", path.display());
    }
    match config.registry {
        Some(ref path) => tracing::info!("Schema catalog: {}", path.display()),
        None => tracing::info!("Schema catalog: built-in"),
    }
    tracing::debug!(
        "Tick every {:?}, highlight {}",
        config.tick,
        config.highlight_color
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(mapper_host::run(&config))?;

    tracing::info!("Schema Mapper exited");
    Ok(())
}
