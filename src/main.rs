//! Nope - Entry point.
//!
//! Loads the configured blocklists, then reads one host name per line from
//! standard input and prints whether it is blocked and by which list.
//! Dynamic lists keep refreshing in the background until Ctrl-C or the end
//! of input.

use std::borrow::Cow;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use nope::blocklist::Blocker;
use nope::config::Config;
use nope::registry::Registry;

async fn run() -> Result<()> {
    let config_path = std::env::var("CONFIG_PATH")
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed("nope.toml"));
    let config = Config::load(&*config_path).context("Failed to load configuration")?;

    info!("Starting nope...");
    info!("Inline blocklist entries: {}", config.inline.len());
    info!("Blocklists configured: {}", config.lists.len());

    let mut registry = Registry::from_config(&config)
        .await
        .context("Failed to load blocklists")?;
    for blocker in registry.blockers() {
        debug!(name = blocker.name(), ready = blocker.ready(), "blocklist loaded");
    }
    info!(
        blocklists = registry.len(),
        ready = registry.ready(),
        "Blocklists loaded"
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down..."),
            Err(err) => {
                warn!(error = ?err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    };
    let result = answer_queries(
        &registry,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await;

    registry.shutdown().await;
    info!("Shutdown complete.");
    result
}

/// Answer host names read from `input` until it closes or `shutdown`
/// completes.
///
/// `shutdown` is polled across every iteration, so a signal that fires while
/// an answer is being written still stops the loop.
async fn answer_queries<R, W>(
    registry: &Registry,
    input: R,
    mut output: W,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            () = &mut shutdown => return Ok(()),
            line = lines.next_line() => line.context("Failed to read input")?,
        };
        let Some(line) = line else {
            return Ok(());
        };

        let host = line.trim();
        if host.is_empty() {
            continue;
        }

        let answer = match registry.block(host) {
            Some(blocker) => format!("{host}\tblocked\t{blocker}\n"),
            None => format!("{host}\tallowed\n"),
        };
        output
            .write_all(answer.as_bytes())
            .await
            .context("Failed to write answer")?;
        output.flush().await.context("Failed to write answer")?;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    run().await
}
