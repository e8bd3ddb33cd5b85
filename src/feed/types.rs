//! Feed configuration, tick types and the channels that connect the pieces.

use crate::types::{HighlightMap, Token, TokenId};
use anyhow::{ensure, Result};
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One simulated price/market-cap move for a single token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTick {
    /// Weak reference; ticks for tokens no longer present are dropped
    pub token_id: TokenId,
    pub new_price: f64,
    pub new_market_cap: f64,
    pub price_change_percent: f64,
}

impl PriceTick {
    /// Tick moving `token` by `price_change_percent`. Price and market cap
    /// share the same multiplicative factor.
    pub fn for_token(token: &Token, price_change_percent: f64) -> Self {
        let factor = 1.0 + price_change_percent / 100.0;
        Self {
            token_id: token.id.clone(),
            new_price: token.price * factor,
            new_market_cap: token.market_cap * factor,
            price_change_percent,
        }
    }
}

/// Ticks delivered by one simulator firing. Never empty.
pub type TickBatch = NonEmpty<PriceTick>;

// --- Communication channels ---

/// Channel the simulator delivers batches on
pub type TickBatchSender = tokio::sync::mpsc::Sender<TickBatch>;
pub type TickBatchReceiver = tokio::sync::mpsc::Receiver<TickBatch>;

/// Latest token collection as observed by the simulator
pub type TokenSnapshotSender = tokio::sync::watch::Sender<Arc<Vec<Token>>>;
pub type TokenSnapshotReceiver = tokio::sync::watch::Receiver<Arc<Vec<Token>>>;

/// Highlight map shared between the reducer pump and the clear timer
pub type SharedHighlights = Arc<RwLock<HighlightMap>>;

/// Timing and sizing knobs for a feed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Period between simulated batches
    pub tick_interval_ms: u64,
    /// How long highlights stay visible before the whole map is cleared
    pub highlight_ttl_ms: u64,
    /// Simulated load latency of a manual refresh
    pub refresh_latency_ms: u64,
    /// Tokens generated per column at start and on refresh
    pub tokens_per_column: usize,
    /// Smallest batch size (inclusive)
    pub min_ticks_per_batch: usize,
    /// Largest batch size (inclusive)
    pub max_ticks_per_batch: usize,
    /// Per-tick moves are drawn from [-max, +max) percent
    pub max_price_change_percent: f64,
    /// Capacity of the simulator → column batch channel
    pub batch_channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            highlight_ttl_ms: 600,
            refresh_latency_ms: 800,
            tokens_per_column: 20,
            min_ticks_per_batch: 1,
            max_ticks_per_batch: 3,
            max_price_change_percent: 5.0,
            batch_channel_capacity: 100,
        }
    }
}

impl FeedConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn highlight_ttl(&self) -> Duration {
        Duration::from_millis(self.highlight_ttl_ms)
    }

    pub fn refresh_latency(&self) -> Duration {
        Duration::from_millis(self.refresh_latency_ms)
    }

    /// Reject configurations the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        ensure!(
            self.min_ticks_per_batch >= 1,
            "min_ticks_per_batch must be at least 1"
        );
        ensure!(
            self.min_ticks_per_batch <= self.max_ticks_per_batch,
            "min_ticks_per_batch ({}) exceeds max_ticks_per_batch ({})",
            self.min_ticks_per_batch,
            self.max_ticks_per_batch
        );
        ensure!(
            self.max_price_change_percent.is_finite() && self.max_price_change_percent >= 0.0,
            "max_price_change_percent must be a non-negative number"
        );
        ensure!(
            self.max_price_change_percent < 100.0,
            "max_price_change_percent must stay below 100 to keep prices positive"
        );
        ensure!(
            self.batch_channel_capacity > 0,
            "batch_channel_capacity must be positive"
        );
        Ok(())
    }
}
