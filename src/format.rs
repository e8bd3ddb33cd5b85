//! Display helpers for money-like figures.

/// `$1.23M`, `$45.60K` or `$812`.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1_000_000.0 {
        format!("${:.2}M", market_cap / 1_000_000.0)
    } else if market_cap >= 1_000.0 {
        format!("${:.2}K", market_cap / 1_000.0)
    } else {
        format!("${}", market_cap)
    }
}

/// `$1.2M`, `$46K` or `$812`.
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000.0 {
        format!("${:.1}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("${:.0}K", volume / 1_000.0)
    } else {
        format!("${}", volume)
    }
}
