//! The host loop: idle ticks and inbound lines on one task, output on another.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mapper_core::{
    Bridge, DocumentError, HighlightOverlay, MemoryDocument, RegistryError, SchemaRegistry,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::transport::{ChannelTransport, OutboundLine};
use crate::HostConfig;

/// Bridge type the host drives.
pub type HostBridge = Bridge<MemoryDocument, ChannelTransport>;

/// Errors that stop the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The document file could not be read or written.
    #[error("document {}: {source}", path.display())]
    Document {
        /// Document path.
        path: PathBuf,
        /// Underlying failure.
        source: DocumentError,
    },
    /// The schema catalog could not be loaded.
    #[error("schema catalog {}: {source}", path.display())]
    Registry {
        /// Catalog path.
        path: PathBuf,
        /// Underlying failure.
        source: RegistryError,
    },
    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The output writer task died.
    #[error("output writer stopped: {0}")]
    Writer(String),
}

/// Open the document and catalog named by `config` and wire up a bridge.
///
/// The selection is marked stale so the first tick sends the UI its
/// initial state.
///
/// # Errors
///
/// Returns [`HostError::Document`] or [`HostError::Registry`] if a file named
/// in the configuration cannot be loaded.
pub fn open(
    config: &HostConfig,
) -> Result<(HostBridge, mpsc::UnboundedReceiver<OutboundLine>), HostError> {
    let document = match &config.document {
        Some(path) => MemoryDocument::load(path).map_err(|source| HostError::Document {
            path: path.clone(),
            source,
        })?,
        None => MemoryDocument::new(),
    };
    let registry = match &config.registry {
        Some(path) => SchemaRegistry::load(path).map_err(|source| HostError::Registry {
            path: path.clone(),
            source,
        })?,
        None => SchemaRegistry::builtin(),
    };
    tracing::info!(
        "Opened document with {} objects, {} schemas in catalog",
        document.len(),
        registry.len()
    );

    let (transport, rx) = ChannelTransport::channel();
    let bridge = Bridge::new(document, transport, Arc::new(registry))
        .with_overlay(HighlightOverlay::new(config.highlight_color));
    bridge.tracker().mark_selection_expired();
    Ok((bridge, rx))
}

/// Drive `bridge` until `input` reaches end of stream.
///
/// Each interval tick services the dirty flags once; each non-empty input
/// line is dispatched as an envelope. Lines that are not UTF-8 are dropped
/// like any other malformed envelope. On end of input anything still pending
/// is flushed, the writer drains and the document and output are handed back.
///
/// # Errors
///
/// Returns an error if reading input fails or the writer task panics.
pub async fn serve<R, W>(
    mut bridge: HostBridge,
    rx: mpsc::UnboundedReceiver<OutboundLine>,
    mut input: R,
    output: W,
    tick: Duration,
) -> Result<(MemoryDocument, W), HostError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer = tokio::spawn(write_lines(rx, output));
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Bytes of the current line; survives a read cancelled by the ticker.
    let mut buf = Vec::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(pushed) = bridge.tick() {
                    tracing::trace!("Pushed {pushed:?}");
                }
            }
            read = input.read_until(b'\n', &mut buf) => {
                if read? == 0 {
                    dispatch_line(&mut bridge, &buf);
                    tracing::info!("Input closed, shutting down");
                    break;
                }
                if buf.ends_with(b"\n") {
                    dispatch_line(&mut bridge, &buf);
                    buf.clear();
                }
            }
        }
    }

    while bridge.tick().is_some() {}
    let (document, transport) = bridge.into_parts();
    drop(transport);

    let output = writer
        .await
        .map_err(|e| HostError::Writer(e.to_string()))??;
    Ok((document, output))
}

fn dispatch_line(bridge: &mut HostBridge, raw: &[u8]) {
    match std::str::from_utf8(raw) {
        Ok(line) => {
            let line = line.trim();
            if !line.is_empty() {
                bridge.dispatch(line);
            }
        }
        Err(e) => tracing::debug!("Dropping inbound line that is not UTF-8: {e}"),
    }
}

async fn write_lines<W>(
    mut rx: mpsc::UnboundedReceiver<OutboundLine>,
    mut output: W,
) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        match line.to_line() {
            Ok(text) => {
                output.write_all(text.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            Err(e) => tracing::warn!("Failed to encode {} event: {e}", line.event),
        }
    }
    Ok(output)
}

/// Run the host on stdin and stdout.
///
/// # Errors
///
/// Returns an error if startup fails, input cannot be read, or the document
/// cannot be saved.
pub async fn run(config: &HostConfig) -> Result<(), HostError> {
    let (bridge, rx) = open(config)?;
    let input = BufReader::new(tokio::io::stdin());
    let (document, _) = serve(bridge, rx, input, tokio::io::stdout(), config.tick).await?;

    if config.save {
        match &config.document {
            Some(path) => {
                document.save(path).map_err(|source| HostError::Document {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!("Saved document to {}", path.display());
            }
            None => tracing::warn!("--save given without --document, nothing written"),
        }
    }
    Ok(())
}
