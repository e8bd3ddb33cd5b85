//! Core types and data structures for the Pulse token feed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque token identifier, assigned once at generation time.
pub type TokenId = String;

/// Coarse status indicator shown next to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Positive,
    Negative,
    Neutral,
}

/// A synthetic token row.
///
/// Identity and display fields never change after generation. Only `price`,
/// `market_cap` and `price_change` are rewritten, and only by the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    pub ticker: String,
    /// Avatar gradient descriptor
    pub avatar: String,
    pub verified: bool,
    /// Human readable age ("42s", "17m", "1h")
    pub age: String,
    pub age_seconds: u64,

    // Social links
    pub has_twitter: bool,
    pub has_website: bool,
    pub has_telegram: bool,

    // Metrics
    pub holders: u32,
    pub pro_traders: u32,
    pub transactions: u32,
    pub comments: u32,

    // Percentages, always within [0, 100]
    pub dev_percent: f64,
    pub bundled_percent: f64,
    pub insider_percent: f64,
    pub sniper_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_hold_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled_hold_time: Option<String>,

    // Financials
    pub market_cap: f64,
    pub volume: f64,
    pub liquidity: f64,
    pub fee: f64,

    // Price
    pub price: f64,
    pub price_change: f64,

    /// Quick-buy amount in SOL
    pub buy_amount: u32,
    /// Bonding curve progress, shown on the Final Stretch column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonding_curve: Option<f64>,

    /// Shortened wallet address ("AbCd...WxYz")
    pub wallet_address: String,
    pub status: TokenStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,
}

/// Transient flash tag for a token whose market cap just moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Positive,
    Negative,
}

impl Highlight {
    /// Sign of a price move; zero counts as positive.
    pub fn from_change(price_change_percent: f64) -> Self {
        if price_change_percent >= 0.0 {
            Highlight::Positive
        } else {
            Highlight::Negative
        }
    }
}

pub type HighlightMap = HashMap<TokenId, Highlight>;

/// The three independent feed columns of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnKind {
    NewPairs,
    FinalStretch,
    Migrated,
}

impl ColumnKind {
    pub fn title(&self) -> &'static str {
        match self {
            ColumnKind::NewPairs => "New Pairs",
            ColumnKind::FinalStretch => "Final Stretch",
            ColumnKind::Migrated => "Migrated",
        }
    }

    /// Only the Final Stretch column renders bonding-curve progress.
    pub fn shows_bonding_curve(&self) -> bool {
        matches!(self, ColumnKind::FinalStretch)
    }

    pub fn all() -> [ColumnKind; 3] {
        [ColumnKind::NewPairs, ColumnKind::FinalStretch, ColumnKind::Migrated]
    }
}

/// Numeric fields a column can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Age,
    Holders,
    MarketCap,
    Volume,
    Transactions,
    DevPercent,
    BundledPercent,
    InsiderPercent,
    SniperPercent,
    /// Anything the view layer sent that we don't know; sorting by it is a no-op.
    #[serde(other)]
    Unknown,
}

impl SortField {
    /// Sort key of `token` for this field, `None` for `Unknown`.
    pub fn key(&self, token: &Token) -> Option<f64> {
        let key = match self {
            SortField::Age => token.age_seconds as f64,
            SortField::Holders => token.holders as f64,
            SortField::MarketCap => token.market_cap,
            SortField::Volume => token.volume,
            SortField::Transactions => token.transactions as f64,
            SortField::DevPercent => token.dev_percent,
            SortField::BundledPercent => token.bundled_percent,
            SortField::InsiderPercent => token.insider_percent,
            SortField::SniperPercent => token.sniper_percent,
            SortField::Unknown => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Sort intent from a header click.
    ///
    /// Clicking the active ascending field flips it to descending; anything
    /// else (a new field, or the active field while descending) is ascending.
    pub fn toggle(&self, field: SortField) -> Self {
        let direction = if self.field == field && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self { field, direction }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            field: SortField::Age,
            direction: SortDirection::Ascending,
        }
    }
}

/// Sparse set of numeric thresholds. `None` means no constraint.
///
/// `age_min`, `holders_max`, `market_cap_max`, `volume_min` and `volume_max`
/// are accepted and round-tripped but not applied by the query engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_min: Option<f64>,
    /// Maximum age in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_percent_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_percent_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insider_percent_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sniper_percent_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_max: Option<f64>,
}

impl FilterConfig {
    /// Number of defined thresholds, reserved ones included.
    pub fn active_count(&self) -> usize {
        [
            self.age_min,
            self.age_max,
            self.holders_min,
            self.holders_max,
            self.dev_percent_max,
            self.bundled_percent_max,
            self.insider_percent_max,
            self.sniper_percent_max,
            self.market_cap_min,
            self.market_cap_max,
            self.volume_min,
            self.volume_max,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn preset(preset: FilterPreset) -> Self {
        match preset {
            FilterPreset::P1 => Self {
                dev_percent_max: Some(5.0),
                bundled_percent_max: Some(5.0),
                ..Self::default()
            },
            FilterPreset::P2 => Self {
                dev_percent_max: Some(10.0),
                insider_percent_max: Some(10.0),
                ..Self::default()
            },
            FilterPreset::P3 => Self {
                sniper_percent_max: Some(5.0),
                ..Self::default()
            },
        }
    }
}

/// Quick filter presets offered in each column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterPreset {
    P1,
    P2,
    P3,
}
