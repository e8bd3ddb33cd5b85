//! Pulse feed - simulated token-discovery feed for a three-column dashboard
//!
//! This crate generates mock token rows, drives them with periodic simulated
//! price ticks, and derives the filtered, sorted and highlighted views a
//! presentation layer renders.

pub mod types;
pub mod feed;
pub mod format;

// Re-export main types for convenience
pub use types::{
    ColumnKind, FilterConfig, FilterPreset, Highlight, HighlightMap, SortConfig, SortDirection,
    SortField, Token, TokenId, TokenStatus,
};
pub use feed::{FeedBuilder, FeedConfig, PulseGrid};
