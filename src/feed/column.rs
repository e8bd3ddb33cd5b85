//! Column sessions - one independent feed/view instance per dashboard column.
//!
//! A `ColumnSession` owns everything a column needs: the token collection,
//! loading/error flags, sort and filter config, the highlight map and its
//! own feed simulator. Batches from the simulator are applied by a single
//! pump task; user intents and refreshes take the same write lock, so no two
//! mutations of one column ever interleave. A refresh runs as its own task
//! and never holds up the caller.

use crate::feed::generator::generate_tokens;
use crate::feed::highlight::{GlobalClearTimer, HighlightExpiry};
use crate::feed::query::query_view;
use crate::feed::reducer::apply_ticks;
use crate::feed::simulator::{FeedHandle, FeedSimulator};
use crate::feed::source::{MockTokenSource, TokenSource};
use crate::feed::types::{
    FeedConfig, PriceTick, SharedHighlights, TickBatch, TickBatchReceiver, TickBatchSender,
    TokenSnapshotSender,
};
use crate::types::{
    ColumnKind, FilterConfig, FilterPreset, HighlightMap, SortConfig, SortField, Token, TokenId,
};
use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Mutable state of one column, minus the highlight map.
#[derive(Debug, Clone)]
pub struct ColumnState {
    pub tokens: Vec<Token>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub sort: SortConfig,
    pub filters: FilterConfig,
    pub active_preset: Option<FilterPreset>,
    pub paused: bool,
}

impl ColumnState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            is_loading: false,
            error: None,
            sort: SortConfig::default(),
            filters: FilterConfig::default(),
            active_preset: None,
            paused: false,
        }
    }

    /// Merge ticks into the collection and return the highlights they produce.
    pub fn apply_batch<'a, I>(&mut self, ticks: I) -> HighlightMap
    where
        I: IntoIterator<Item = &'a PriceTick>,
    {
        let reduced = apply_ticks(&self.tokens, ticks);
        self.tokens = reduced.tokens;
        reduced.highlights
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = self.sort.toggle(field);
    }

    /// Replace the filters wholesale; a manual edit deselects any preset.
    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
        self.active_preset = None;
    }

    /// Select a preset, or clear filters if it is already the active one.
    pub fn toggle_preset(&mut self, preset: FilterPreset) {
        if self.active_preset == Some(preset) {
            self.active_preset = None;
            self.filters = FilterConfig::default();
        } else {
            self.active_preset = Some(preset);
            self.filters = FilterConfig::preset(preset);
        }
    }

    /// Filtered and sorted tokens for display.
    pub fn view(&self) -> Vec<Token> {
        query_view(&self.tokens, &self.filters, &self.sort)
    }
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub kind: ColumnKind,
    pub title: &'static str,
    pub tokens: Vec<Token>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_connected: bool,
    pub paused: bool,
    pub sort: SortConfig,
    pub filters: FilterConfig,
    pub active_filter_count: usize,
    pub active_preset: Option<FilterPreset>,
    pub highlights: HighlightMap,
    pub show_bonding_curve: bool,
}

/// Toast payload for a quick-buy click. No order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyNotice {
    pub title: String,
    pub description: String,
}

/// Everything the pump needs to apply a batch.
#[derive(Clone)]
struct BatchApplier {
    state: Arc<RwLock<ColumnState>>,
    highlights: SharedHighlights,
    snapshot: Arc<TokenSnapshotSender>,
    expiry: Arc<dyn HighlightExpiry>,
}

impl BatchApplier {
    async fn deliver(&self, batch: &TickBatch) {
        // Prices and their highlights become visible together
        let mut state = self.state.write().await;
        let fresh = state.apply_batch(batch.iter());
        self.snapshot.send_replace(Arc::new(state.tokens.clone()));
        debug!("Applied batch of {} ticks, {} highlighted", batch.len(), fresh.len());
        *self.highlights.write().await = fresh;
        drop(state);

        self.expiry.schedule_clear(self.highlights.clone());
    }

    async fn run(self, mut batches: TickBatchReceiver) {
        while let Some(batch) = batches.recv().await {
            self.deliver(&batch).await;
        }
        debug!("Batch channel closed, pump exiting");
    }
}

/// Starts and stops the column's simulator from the session or a refresh task.
#[derive(Clone)]
struct FeedLauncher {
    kind: ColumnKind,
    simulator: FeedSimulator,
    state: Arc<RwLock<ColumnState>>,
    snapshot: Arc<TokenSnapshotSender>,
    feed: Arc<Mutex<Option<FeedHandle>>>,
}

impl FeedLauncher {
    fn slot(&self) -> MutexGuard<'_, Option<FeedHandle>> {
        self.feed.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_connected(&self) -> bool {
        self.slot().as_ref().map_or(false, |feed| feed.is_connected())
    }

    /// Start the simulator unless it is running, the column is paused, or
    /// the collection is empty.
    async fn launch(&self, batch_tx: TickBatchSender) {
        // Held until the handle is stored so a concurrent pause waits for us
        let state = self.state.read().await;
        if state.paused {
            debug!("{} column is paused, not starting feed", self.kind.title());
            return;
        }
        if state.tokens.is_empty() {
            info!("{} column has no tokens, feed stays idle", self.kind.title());
            return;
        }

        let mut slot = self.slot();
        if slot.as_ref().map_or(false, |feed| !feed.is_finished()) {
            return;
        }
        info!("Starting feed for {} column", self.kind.title());
        *slot = Some(self.simulator.start(self.snapshot.subscribe(), batch_tx));
    }

    async fn halt(&self) {
        let feed = self.slot().take();
        if let Some(feed) = feed {
            feed.stop().await;
        }
    }
}

/// Load a replacement collection and swap it in, then bring the feed back.
#[instrument(skip_all, fields(column = launcher.kind.title()))]
async fn run_refresh(
    source: Arc<dyn TokenSource>,
    count: usize,
    launcher: FeedLauncher,
    batch_tx: Option<TickBatchSender>,
) {
    let loaded = source.load(count).await;

    {
        let mut state = launcher.state.write().await;
        match loaded {
            Ok(tokens) => {
                info!("Loaded {} tokens", tokens.len());
                state.tokens = tokens;
                launcher
                    .snapshot
                    .send_replace(Arc::new(state.tokens.clone()));
            }
            Err(e) => {
                error!("Failed to load tokens: {:#}", e);
                state.error = Some(format!("Failed to load tokens: {}", e));
            }
        }
        state.is_loading = false;
    }

    // The simulator ends itself on an empty collection; bring it back
    if let Some(batch_tx) = batch_tx {
        launcher.launch(batch_tx).await;
    }
}

/// One live column: state, simulator and pump.
pub struct ColumnSession {
    kind: ColumnKind,
    config: FeedConfig,
    source: Arc<dyn TokenSource>,
    applier: BatchApplier,
    launcher: FeedLauncher,
    batch_tx: Option<TickBatchSender>,
    batch_rx: Option<TickBatchReceiver>,
    pump: Option<JoinHandle<()>>,
    refresh_task: Option<JoinHandle<()>>,
}

impl ColumnSession {
    /// Column seeded with freshly generated tokens and the mock refresh source.
    pub fn new(kind: ColumnKind, config: FeedConfig) -> Result<Self> {
        let source = Arc::new(MockTokenSource::from_config(&config));
        Self::with_source(kind, config, source)
    }

    pub fn with_source(
        kind: ColumnKind,
        config: FeedConfig,
        source: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        let expiry = Arc::new(GlobalClearTimer::new(config.highlight_ttl()));
        Self::with_parts(kind, config, source, expiry)
    }

    /// Full control over the refresh source and the highlight expiry policy.
    pub fn with_parts(
        kind: ColumnKind,
        config: FeedConfig,
        source: Arc<dyn TokenSource>,
        expiry: Arc<dyn HighlightExpiry>,
    ) -> Result<Self> {
        let simulator = FeedSimulator::new(config.clone())?;

        let tokens = generate_tokens(config.tokens_per_column);
        let (snapshot, _) = watch::channel(Arc::new(tokens.clone()));
        let (batch_tx, batch_rx) = mpsc::channel(config.batch_channel_capacity);

        let state = Arc::new(RwLock::new(ColumnState::new(tokens)));
        let snapshot = Arc::new(snapshot);
        let applier = BatchApplier {
            state: state.clone(),
            highlights: Arc::new(RwLock::new(HighlightMap::new())),
            snapshot: snapshot.clone(),
            expiry,
        };
        let launcher = FeedLauncher {
            kind,
            simulator,
            state,
            snapshot,
            feed: Arc::new(Mutex::new(None)),
        };

        Ok(Self {
            kind,
            config,
            source,
            applier,
            launcher,
            batch_tx: Some(batch_tx),
            batch_rx: Some(batch_rx),
            pump: None,
            refresh_task: None,
        })
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Start the pump (once) and the simulator, unless paused, shut down,
    /// already running, or the collection is empty.
    pub async fn start(&mut self) {
        if let Some(batch_rx) = self.batch_rx.take() {
            self.pump = Some(tokio::spawn(self.applier.clone().run(batch_rx)));
        }

        let Some(batch_tx) = self.batch_tx.clone() else {
            warn!("{} column is shut down, not starting feed", self.kind.title());
            return;
        };
        self.launcher.launch(batch_tx).await;
    }

    /// Stop the simulator. Highlights already scheduled to clear still clear.
    pub async fn stop(&mut self) {
        self.launcher.halt().await;
    }

    pub fn is_connected(&self) -> bool {
        self.launcher.is_connected()
    }

    /// Apply a batch exactly as the live pump would.
    pub async fn deliver_batch(&self, batch: &TickBatch) {
        self.applier.deliver(batch).await;
    }

    /// Begin reloading the whole collection; returns without waiting for it.
    ///
    /// Sets loading and clears any error up front. After the source's
    /// latency the collection is replaced and loading clears. A failed load
    /// leaves the old tokens in place and records the error for the view to
    /// show with a retry affordance. A refresh still in flight is superseded.
    pub async fn refresh(&mut self) {
        if let Some(previous) = self.refresh_task.take() {
            previous.abort();
        }

        {
            let mut state = self.applier.state.write().await;
            state.is_loading = true;
            state.error = None;
        }
        debug!("Refresh requested for {} column", self.kind.title());

        // Only a started column gets its feed brought back afterwards
        let batch_tx = self.pump.as_ref().and(self.batch_tx.clone());
        self.refresh_task = Some(tokio::spawn(run_refresh(
            self.source.clone(),
            self.config.tokens_per_column,
            self.launcher.clone(),
            batch_tx,
        )));
    }

    /// Wait for the in-flight refresh, if any, to land.
    pub async fn wait_for_refresh(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Refresh for {} column ended abnormally: {}", self.kind.title(), e);
                }
            }
        }
    }

    pub async fn toggle_sort(&self, field: SortField) {
        self.applier.state.write().await.toggle_sort(field);
    }

    pub async fn apply_filters(&self, filters: FilterConfig) {
        self.applier.state.write().await.set_filters(filters);
    }

    pub async fn toggle_preset(&self, preset: FilterPreset) {
        self.applier.state.write().await.toggle_preset(preset);
    }

    /// Stop ticking without losing the collection.
    pub async fn pause(&mut self) {
        self.applier.state.write().await.paused = true;
        self.stop().await;
        info!("{} column paused", self.kind.title());
    }

    pub async fn resume(&mut self) {
        self.applier.state.write().await.paused = false;
        info!("{} column resumed", self.kind.title());
        self.start().await;
    }

    /// Quick-buy intent for a token currently in the collection.
    pub async fn quick_buy(&self, token_id: &TokenId) -> Option<BuyNotice> {
        let state = self.applier.state.read().await;
        let token = state.tokens.iter().find(|t| &t.id == token_id)?;
        let notice = BuyNotice {
            title: "Quick Buy".to_string(),
            description: format!("Buying {} SOL of {}...", token.buy_amount, token.ticker),
        };
        info!("{}: {}", notice.title, notice.description);
        Some(notice)
    }

    /// Raw collection in generation order.
    pub async fn tokens(&self) -> Vec<Token> {
        self.applier.state.read().await.tokens.clone()
    }

    pub async fn highlights(&self) -> HighlightMap {
        self.applier.highlights.read().await.clone()
    }

    pub async fn view(&self) -> ColumnView {
        let state = self.applier.state.read().await;
        let highlights = self.applier.highlights.read().await.clone();
        ColumnView {
            kind: self.kind,
            title: self.kind.title(),
            tokens: state.view(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            is_connected: self.is_connected(),
            paused: state.paused,
            sort: state.sort,
            filters: state.filters.clone(),
            active_filter_count: state.filters.active_count(),
            active_preset: state.active_preset,
            highlights,
            show_bonding_curve: self.kind.shows_bonding_curve(),
        }
    }

    /// Tear the column down: no refresh, no simulator, no pump, no pending clears.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
            // Cancellation is the expected outcome here
            let _ = task.await;
        }
        self.stop().await;
        self.batch_tx = None;
        self.batch_rx = None;
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                warn!("Pump for {} column ended abnormally: {}", self.kind.title(), e);
            }
        }
        self.applier.expiry.cancel_clear();
        info!("{} column shut down", self.kind.title());
    }
}

impl Drop for ColumnSession {
    fn drop(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
