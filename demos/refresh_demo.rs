//! Refresh Failure Demo
//!
//! Shows the column error path: a token source that fails on its first load,
//! the error state a renderer would show with a retry button, and recovery
//! on the retry.

use anyhow::{bail, Result};
use async_trait::async_trait;
use pulse_feed::feed::{generate_tokens, ColumnSession, FeedConfig, TokenSource};
use pulse_feed::{ColumnKind, Token};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber;

/// Fails the first load, succeeds afterwards.
struct FlakySource {
    attempts: AtomicUsize,
}

#[async_trait]
impl TokenSource for FlakySource {
    async fn load(&self, count: usize) -> Result<Vec<Token>> {
        tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            bail!("upstream returned 503");
        }
        Ok(generate_tokens(count))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Refresh Failure Demo");

    let source = Arc::new(FlakySource {
        attempts: AtomicUsize::new(0),
    });
    let config = FeedConfig::default();
    let mut column = ColumnSession::with_source(ColumnKind::Migrated, config, source)?;
    column.start().await;

    column.refresh().await;
    info!("Loading: {}", column.view().await.is_loading);
    column.wait_for_refresh().await;
    let view = column.view().await;
    if let Some(error) = &view.error {
        warn!("Column shows error: {} ({} stale tokens kept)", error, view.tokens.len());
    }

    info!("Retrying...");
    column.refresh().await;
    column.wait_for_refresh().await;
    let view = column.view().await;
    info!(
        "After retry: error={:?}, {} tokens, connected={}",
        view.error,
        view.tokens.len(),
        view.is_connected
    );

    column.shutdown().await;
    Ok(())
}
