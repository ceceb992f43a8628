//! # Schema Mapper Host
//!
//! Headless host that runs the mapper bridge against a document file.
//!
//! Inbound UI envelopes arrive one per line on stdin. Outbound events leave
//! one per line on stdout as `{"event": "...", "payload": ...}`. Logs go to
//! stderr so stdout stays a clean event stream.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p mapper-host -- --document model.json --save
//! ```
//!
//! ## With a custom schema catalog:
//!
//! ```bash
//! cargo run -p mapper-host -- --document model.json --registry schemas.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Document, catalog, tick interval and highlight settings
//! - `ChannelTransport` - Non-blocking outbound transport feeding a writer task
//! - `run` / `serve` - The idle-tick and inbound-line loop

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod runner;
mod transport;

pub use runner::{open, run, serve, HostBridge, HostError};
pub use transport::{ChannelTransport, OutboundLine};

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mapper_core::Color;

/// Default idle tick interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 50;

/// Command-line arguments for schema-mapper.
#[derive(Debug, Clone, Parser)]
#[command(name = "schema-mapper")]
#[command(about = "Classify CAD selections and track export schema assignments")]
#[command(version)]
pub struct CliArgs {
    /// Document file to open (JSON). Starts with an empty document if omitted.
    #[arg(long, env = "MAPPER_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Schema catalog file (JSON array). Uses the built-in catalog if omitted.
    #[arg(long, env = "MAPPER_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Idle tick interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Write the document back when stdin closes
    #[arg(long)]
    pub save: bool,

    /// Hover highlight colour (e.g. #4169E1)
    #[arg(long)]
    pub highlight_color: Option<Color>,
}

/// Host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Document file, if any.
    pub document: Option<PathBuf>,
    /// Schema catalog file, if any.
    pub registry: Option<PathBuf>,
    /// Idle tick interval.
    pub tick: Duration,
    /// Save the document on shutdown.
    pub save: bool,
    /// Hover highlight colour.
    pub highlight_color: Color,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: None,
            registry: None,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            save: false,
            highlight_color: Color::default(),
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            document: args.document,
            registry: args.registry,
            // A zero period would make the interval panic.
            tick: Duration::from_millis(args.tick_ms.max(1)),
            save: args.save,
            highlight_color: args.highlight_color.unwrap_or_default(),
        }
    }
}
