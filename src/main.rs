//! Main entry point for the Pulse feed demo
//!
//! Runs the three dashboard columns headlessly, prints what a renderer would
//! see after a few batches, exercises the user intents, then tears down.

use anyhow::Result;
use pulse_feed::feed::PulseGrid;
use pulse_feed::format::{format_market_cap, format_volume};
use pulse_feed::{ColumnKind, FeedBuilder, FilterPreset, SortField};
use tokio::time::{sleep, Duration};
use tracing::{info, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting Pulse feed demo");

    let mut grid = FeedBuilder::new()
        .with_tick_interval_ms(500)
        .with_tokens_per_column(8)
        .build_grid()?;
    grid.start().await;
    info!("Connection: {}", grid.connection_status().label());

    // Let a few batches land
    sleep(Duration::from_millis(1600)).await;
    print_grid(&grid).await;

    // User intents on the first column
    {
        let column = grid.column(ColumnKind::NewPairs);
        column.toggle_sort(SortField::MarketCap).await;
        column.toggle_sort(SortField::MarketCap).await;
        column.toggle_preset(FilterPreset::P3).await;

        if let Some(token) = column.tokens().await.first() {
            if let Some(notice) = column.quick_buy(&token.id).await {
                info!("Toast: {} - {}", notice.title, notice.description);
            }
        }
    }

    info!("Refreshing all columns...");
    grid.refresh_all().await;
    for view in grid.views().await {
        info!("{} loading: {}", view.title, view.is_loading);
    }
    grid.wait_for_refresh().await;
    sleep(Duration::from_millis(600)).await;
    print_grid(&grid).await;

    // One column as the JSON a renderer would consume
    let view = grid.column(ColumnKind::FinalStretch).view().await;
    println!("{}", serde_json::to_string_pretty(&view)?);

    grid.shutdown().await;
    info!("Demo completed. Connection: {}", grid.connection_status().label());

    Ok(())
}

/// Print each column's view the way the dashboard lays it out.
async fn print_grid(grid: &PulseGrid) {
    for view in grid.views().await {
        println!(
            "== {} ({} tokens, {} filters, sort {:?} {:?})",
            view.title,
            view.tokens.len(),
            view.active_filter_count,
            view.sort.field,
            view.sort.direction
        );
        for token in &view.tokens {
            let flash = match view.highlights.get(&token.id) {
                Some(highlight) => format!("{:?}", highlight),
                None => String::new(),
            };
            println!(
                "  {:<14} {:>10} vol {:>6} holders {:>4} age {:>4} {}",
                token.name,
                format_market_cap(token.market_cap),
                format_volume(token.volume),
                token.holders,
                token.age,
                flash
            );
        }
    }
}
