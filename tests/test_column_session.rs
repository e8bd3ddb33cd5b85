//! Tests for column session intents: refresh, errors, pause and sorting

use anyhow::{bail, Result};
use async_trait::async_trait;
use pulse_feed::feed::{generate_tokens, ColumnSession, FeedConfig, PulseGrid, TokenSource};
use pulse_feed::{ColumnKind, FilterConfig, FilterPreset, SortDirection, SortField, Token};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

fn fast_config() -> FeedConfig {
    FeedConfig {
        tick_interval_ms: 20,
        highlight_ttl_ms: 50,
        refresh_latency_ms: 10,
        tokens_per_column: 6,
        ..FeedConfig::default()
    }
}

/// Hands out scripted results in order, then generated tokens.
struct ScriptedSource {
    calls: AtomicUsize,
    script: Vec<Option<usize>>,
}

impl ScriptedSource {
    fn new(script: Vec<Option<usize>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script,
        })
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    async fn load(&self, count: usize) -> Result<Vec<Token>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(call).copied() {
            Some(None) => bail!("upstream unavailable"),
            Some(Some(n)) => Ok(generate_tokens(n)),
            None => Ok(generate_tokens(count)),
        }
    }
}

#[tokio::test]
async fn test_refresh_replaces_collection() -> Result<()> {
    let mut column = ColumnSession::new(ColumnKind::NewPairs, fast_config())?;
    let before: HashSet<_> = column.tokens().await.into_iter().map(|t| t.id).collect();

    column.refresh().await;
    column.wait_for_refresh().await;

    let view = column.view().await;
    assert!(!view.is_loading);
    assert!(view.error.is_none());
    assert_eq!(view.tokens.len(), 6);
    assert!(view.tokens.iter().all(|t| !before.contains(&t.id)));
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_sets_error_and_retry_clears_it() -> Result<()> {
    let source = ScriptedSource::new(vec![None]);
    let mut column = ColumnSession::with_source(ColumnKind::Migrated, fast_config(), source)?;
    let original = column.tokens().await;

    column.refresh().await;
    column.wait_for_refresh().await;
    let view = column.view().await;
    assert!(!view.is_loading);
    let error = view.error.expect("error should be set");
    assert!(error.contains("upstream unavailable"));
    assert_eq!(column.tokens().await, original);

    column.refresh().await;
    assert!(column.view().await.error.is_none());
    column.wait_for_refresh().await;
    let view = column.view().await;
    assert!(view.error.is_none());
    assert_ne!(column.tokens().await, original);
    Ok(())
}

#[tokio::test]
async fn test_refresh_is_loading_until_latency_passes() -> Result<()> {
    let config = FeedConfig {
        refresh_latency_ms: 300,
        ..fast_config()
    };
    let mut column = ColumnSession::new(ColumnKind::NewPairs, config)?;
    let before = column.tokens().await;

    let started = Instant::now();
    column.refresh().await;
    assert!(started.elapsed() < Duration::from_millis(300));

    // Intents and views keep working while the load is in flight
    column.toggle_sort(SortField::Volume).await;
    let view = column.view().await;
    assert!(view.is_loading);
    assert!(view.error.is_none());
    assert_eq!(view.sort.field, SortField::Volume);
    assert_eq!(column.tokens().await, before);

    sleep(Duration::from_millis(100)).await;
    assert!(column.view().await.is_loading);
    assert_eq!(column.tokens().await, before);

    column.wait_for_refresh().await;
    assert!(started.elapsed() >= Duration::from_millis(300));
    let view = column.view().await;
    assert!(!view.is_loading);
    let after = column.tokens().await;
    assert_eq!(after.len(), 6);
    assert!(after.iter().all(|t| before.iter().all(|b| b.id != t.id)));
    Ok(())
}

#[tokio::test]
async fn test_refresh_supersedes_one_in_flight() -> Result<()> {
    let config = FeedConfig {
        refresh_latency_ms: 200,
        ..fast_config()
    };
    let mut column = ColumnSession::new(ColumnKind::NewPairs, config)?;
    let before = column.tokens().await;

    column.refresh().await;
    sleep(Duration::from_millis(50)).await;
    column.refresh().await;

    // The first load would have landed by now had it not been dropped
    sleep(Duration::from_millis(170)).await;
    assert!(column.view().await.is_loading);
    assert_eq!(column.tokens().await, before);

    column.wait_for_refresh().await;
    assert!(!column.view().await.is_loading);
    assert_ne!(column.tokens().await, before);
    Ok(())
}

#[tokio::test]
async fn test_feed_stops_on_empty_and_restarts_after_refresh() -> Result<()> {
    let source = ScriptedSource::new(vec![Some(0)]);
    let mut column = ColumnSession::with_source(ColumnKind::NewPairs, fast_config(), source)?;
    column.start().await;
    assert!(column.is_connected());

    column.refresh().await;
    column.wait_for_refresh().await;
    assert!(column.tokens().await.is_empty());
    sleep(Duration::from_millis(100)).await;
    assert!(!column.is_connected());

    column.refresh().await;
    column.wait_for_refresh().await;
    assert_eq!(column.tokens().await.len(), 6);
    assert!(column.is_connected());

    column.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_pause_and_resume() -> Result<()> {
    let mut column = ColumnSession::new(ColumnKind::FinalStretch, fast_config())?;
    column.start().await;
    assert!(column.is_connected());

    column.pause().await;
    assert!(!column.is_connected());
    assert!(column.view().await.paused);

    // A batch already queued before the pause may still land
    sleep(Duration::from_millis(30)).await;
    let frozen = column.tokens().await;
    sleep(Duration::from_millis(80)).await;
    assert_eq!(column.tokens().await, frozen);

    column.resume().await;
    assert!(column.is_connected());
    assert!(!column.view().await.paused);

    column.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_sort_and_filter_intents_shape_view() -> Result<()> {
    let column = ColumnSession::new(ColumnKind::NewPairs, FeedConfig::default())?;

    column.toggle_sort(SortField::Holders).await;
    let view = column.view().await;
    assert_eq!(view.sort.field, SortField::Holders);
    assert_eq!(view.sort.direction, SortDirection::Ascending);
    for pair in view.tokens.windows(2) {
        assert!(pair[0].holders <= pair[1].holders);
    }

    column.toggle_sort(SortField::Holders).await;
    let view = column.view().await;
    assert_eq!(view.sort.direction, SortDirection::Descending);
    for pair in view.tokens.windows(2) {
        assert!(pair[0].holders >= pair[1].holders);
    }

    column
        .apply_filters(FilterConfig {
            dev_percent_max: Some(30.0),
            ..FilterConfig::default()
        })
        .await;
    let view = column.view().await;
    assert_eq!(view.active_filter_count, 1);
    assert!(view.tokens.iter().all(|t| t.dev_percent <= 30.0));

    column.toggle_preset(FilterPreset::P3).await;
    let view = column.view().await;
    assert_eq!(view.active_preset, Some(FilterPreset::P3));
    assert_eq!(view.filters, FilterConfig::preset(FilterPreset::P3));
    assert!(view.tokens.iter().all(|t| t.sniper_percent <= 5.0));

    // The raw collection is never narrowed by the view
    assert_eq!(column.tokens().await.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_grid_connectivity_is_all_columns() -> Result<()> {
    let mut grid = PulseGrid::new(fast_config())?;
    assert!(!grid.is_connected());

    grid.start().await;
    assert!(grid.is_connected());

    grid.column_mut(ColumnKind::Migrated).pause().await;
    assert!(!grid.is_connected());
    assert!(grid.column(ColumnKind::NewPairs).is_connected());

    grid.column_mut(ColumnKind::Migrated).resume().await;
    assert!(grid.is_connected());

    grid.refresh_all().await;
    grid.wait_for_refresh().await;
    for view in grid.views().await {
        assert!(!view.is_loading);
        assert_eq!(view.tokens.len(), 6);
    }

    grid.shutdown().await;
    assert!(!grid.is_connected());
    Ok(())
}

#[tokio::test]
async fn test_grid_from_columns_keeps_failures_local() -> Result<()> {
    let config = fast_config();
    let failing = ScriptedSource::new(vec![None]);
    let mut grid = PulseGrid::from_columns(
        ColumnSession::new(ColumnKind::NewPairs, config.clone())?,
        ColumnSession::with_source(ColumnKind::FinalStretch, config.clone(), failing)?,
        ColumnSession::new(ColumnKind::Migrated, config)?,
    );
    let stale = grid.column(ColumnKind::FinalStretch).tokens().await;

    grid.refresh_all().await;
    for view in grid.views().await {
        assert!(view.is_loading);
    }
    grid.wait_for_refresh().await;

    for view in grid.views().await {
        assert!(!view.is_loading);
        if view.kind == ColumnKind::FinalStretch {
            assert!(view.error.is_some());
        } else {
            assert!(view.error.is_none());
        }
    }
    assert_eq!(grid.column(ColumnKind::FinalStretch).tokens().await, stale);

    grid.shutdown().await;
    Ok(())
}
