//! Feed reducer - merges tick batches into a token collection.
//!
//! Pure function over (tokens, ticks) so the live pump and tests drive it
//! identically.

use crate::feed::types::PriceTick;
use crate::types::{Highlight, HighlightMap, Token};
use std::collections::HashMap;
use tracing::debug;

/// Result of applying one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedBatch {
    pub tokens: Vec<Token>,
    /// Highlight per token touched by this batch, replacing any previous map
    pub highlights: HighlightMap,
    /// Distinct tick targets that are not in the collection
    pub dropped: usize,
}

/// Apply `ticks` to `tokens`.
///
/// Ticks are folded left to right into one pending update per id, so when
/// a batch names the same token twice the later tick wins for both the
/// market fields and the highlight sign. Untouched tokens pass through
/// unchanged and get no highlight.
pub fn apply_ticks<'a, I>(tokens: &[Token], ticks: I) -> ReducedBatch
where
    I: IntoIterator<Item = &'a PriceTick>,
{
    let mut pending: HashMap<&str, &PriceTick> = HashMap::new();
    for tick in ticks {
        pending.insert(tick.token_id.as_str(), tick);
    }

    let mut highlights = HighlightMap::new();
    let mut applied = 0;
    let updated: Vec<Token> = tokens
        .iter()
        .map(|token| match pending.get(token.id.as_str()) {
            Some(tick) => {
                applied += 1;
                let highlight = Highlight::from_change(tick.price_change_percent);
                highlights.insert(token.id.clone(), highlight);
                Token {
                    price: tick.new_price,
                    market_cap: tick.new_market_cap,
                    price_change: tick.price_change_percent,
                    ..token.clone()
                }
            }
            None => token.clone(),
        })
        .collect();

    let dropped = pending.len() - applied;
    if dropped > 0 {
        debug!("Dropped {} ticks for tokens no longer in the collection", dropped);
    }

    ReducedBatch {
        tokens: updated,
        highlights,
        dropped,
    }
}
