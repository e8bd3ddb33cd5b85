//! Feed module - simulated token feed and derived view pipeline.
//!
//! Generator seeds a collection, the simulator emits tick batches, the
//! reducer merges them and stamps highlights, and the query engine filters
//! and sorts the result for display. Columns and the grid wire these
//! together per dashboard column.

pub mod types;
pub mod generator;
pub mod simulator;
pub mod reducer;
pub mod highlight;
pub mod query;
pub mod source;
pub mod column;
pub mod grid;

// Re-export main types
pub use types::{
    FeedConfig, PriceTick, TickBatch, TickBatchSender, TickBatchReceiver,
    TokenSnapshotSender, TokenSnapshotReceiver, SharedHighlights,
};

// Re-export key components
pub use generator::{generate_tokens, generate_tokens_with};
pub use simulator::{FeedSimulator, FeedHandle, generate_batch};
pub use reducer::{apply_ticks, ReducedBatch};
pub use highlight::{HighlightExpiry, GlobalClearTimer};
pub use query::{query_view, matches_filters, sort_tokens};
pub use source::{TokenSource, MockTokenSource};
pub use column::{ColumnSession, ColumnState, ColumnView, BuyNotice};
pub use grid::{PulseGrid, ConnectionStatus};

/// Feed builder for convenient construction with sensible defaults.
pub struct FeedBuilder {
    config: FeedConfig,
}

impl FeedBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: FeedConfig::default(),
        }
    }

    /// Set the period between tick batches.
    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.tick_interval_ms = interval_ms;
        self
    }

    /// Set how long highlights stay visible.
    pub fn with_highlight_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.config.highlight_ttl_ms = ttl_ms;
        self
    }

    /// Set the simulated refresh latency.
    pub fn with_refresh_latency_ms(mut self, latency_ms: u64) -> Self {
        self.config.refresh_latency_ms = latency_ms;
        self
    }

    /// Set the number of tokens per column.
    pub fn with_tokens_per_column(mut self, count: usize) -> Self {
        self.config.tokens_per_column = count;
        self
    }

    /// Set the inclusive range of ticks per batch.
    pub fn with_batch_size(mut self, min: usize, max: usize) -> Self {
        self.config.min_ticks_per_batch = min;
        self.config.max_ticks_per_batch = max;
        self
    }

    /// Set the largest per-tick move in percent.
    pub fn with_max_price_change_percent(mut self, percent: f64) -> Self {
        self.config.max_price_change_percent = percent;
        self
    }

    /// Build the feed configuration.
    pub fn build_config(self) -> FeedConfig {
        self.config
    }

    /// Build a single column session.
    pub fn build_column(self, kind: crate::types::ColumnKind) -> anyhow::Result<ColumnSession> {
        ColumnSession::new(kind, self.config)
    }

    /// Build the three-column grid.
    pub fn build_grid(self) -> anyhow::Result<PulseGrid> {
        PulseGrid::new(self.config)
    }
}

impl Default for FeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}
