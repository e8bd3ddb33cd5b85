//! FeedSimulator - manufactures price tick batches for the live collection
//!
//! There is no market connection behind this. Every `tick_interval` the
//! simulator picks 1-3 tokens (with replacement) from the latest observed
//! collection and moves each by a uniform random percentage.

use crate::feed::types::{
    FeedConfig, PriceTick, TickBatch, TickBatchSender, TokenSnapshotReceiver,
};
use crate::types::Token;
use anyhow::Result;
use nonempty::NonEmpty;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Build one batch against `tokens`. Returns `None` only for an empty collection.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    tokens: &[Token],
    config: &FeedConfig,
) -> Option<TickBatch> {
    if tokens.is_empty() {
        return None;
    }

    let count = rng.gen_range(config.min_ticks_per_batch..=config.max_ticks_per_batch);
    let bound = config.max_price_change_percent;
    let ticks: Vec<PriceTick> = (0..count)
        .map(|_| {
            let token = &tokens[rng.gen_range(0..tokens.len())];
            let change = if bound > 0.0 {
                rng.gen_range(-bound..bound)
            } else {
                0.0
            };
            PriceTick::for_token(token, change)
        })
        .collect();

    NonEmpty::from_vec(ticks)
}

/// Periodic tick source for one column.
#[derive(Debug, Clone)]
pub struct FeedSimulator {
    config: FeedConfig,
}

impl FeedSimulator {
    /// Rejects configs the periodic task could not run with.
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Start producing batches for whatever collection `observed` holds at each firing.
    ///
    /// The returned handle reports connected immediately. The task ends when
    /// stopped, when the observed collection is empty at a firing, or when the
    /// batch receiver goes away.
    pub fn start(&self, observed: TokenSnapshotReceiver, on_batch: TickBatchSender) -> FeedHandle {
        let connected = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_feed(
            self.config.clone(),
            observed,
            on_batch,
            shutdown_rx,
            connected.clone(),
        ));

        info!(
            "Feed simulator started, ticking every {}ms",
            self.config.tick_interval_ms
        );

        FeedHandle {
            connected,
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

async fn run_feed(
    config: FeedConfig,
    observed: TokenSnapshotReceiver,
    on_batch: TickBatchSender,
    mut shutdown: oneshot::Receiver<()>,
    connected: Arc<AtomicBool>,
) {
    let period = config.tick_interval();
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rng = StdRng::from_entropy();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Feed simulator received shutdown");
                break;
            }
            _ = interval.tick() => {
                let tokens = observed.borrow().clone();
                let Some(batch) = generate_batch(&mut rng, &tokens, &config) else {
                    info!("Observed collection is empty, stopping feed simulator");
                    break;
                };

                debug!("Emitting batch of {} ticks", batch.len());
                if on_batch.send(batch).await.is_err() {
                    warn!("Batch receiver dropped, stopping feed simulator");
                    break;
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
}

/// Owner of a running simulator. Dropping it aborts the periodic task.
pub struct FeedHandle {
    connected: Arc<AtomicBool>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Whether the periodic task has ended on its own or been stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the periodic task and wait for it to wind down.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // Err means the task already exited on its own
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                warn!("Feed simulator task ended abnormally: {}", e);
            }
        }
        self.connected.store(false, Ordering::SeqCst);
        info!("Feed simulator stopped");
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.task.abort();
        self.connected.store(false, Ordering::SeqCst);
    }
}
