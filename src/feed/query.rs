//! Query engine - filter and sort a token collection for display.

use crate::types::{FilterConfig, SortConfig, SortDirection, SortField, Token};
use std::cmp::Ordering;

/// View-ready ordering of `tokens` under `filters` and `sort`.
///
/// Pure; safe to recompute on every change. Filters compose with AND and
/// the sort is stable, so equal keys keep their input order.
pub fn query_view(tokens: &[Token], filters: &FilterConfig, sort: &SortConfig) -> Vec<Token> {
    let mut result: Vec<Token> = tokens
        .iter()
        .filter(|token| matches_filters(token, filters))
        .cloned()
        .collect();
    sort_tokens(&mut result, sort);
    result
}

/// Whether `token` passes every defined threshold.
///
/// `*_max` keeps values at or below the threshold, `*_min` keeps values at
/// or above it. `age_max` is in minutes.
pub fn matches_filters(token: &Token, filters: &FilterConfig) -> bool {
    let at_most = |value: f64, limit: Option<f64>| limit.map_or(true, |max| value <= max);
    let at_least = |value: f64, limit: Option<f64>| limit.map_or(true, |min| value >= min);

    at_most(token.age_seconds as f64, filters.age_max.map(|minutes| minutes * 60.0))
        && at_least(token.holders as f64, filters.holders_min)
        && at_most(token.dev_percent, filters.dev_percent_max)
        && at_most(token.bundled_percent, filters.bundled_percent_max)
        && at_most(token.insider_percent, filters.insider_percent_max)
        && at_most(token.sniper_percent, filters.sniper_percent_max)
        && at_least(token.market_cap, filters.market_cap_min)
}

/// Stable in-place sort by a single field. `SortField::Unknown` leaves the order alone.
pub fn sort_tokens(tokens: &mut [Token], sort: &SortConfig) {
    let field = sort.field;
    if field == SortField::Unknown {
        return;
    }
    tokens.sort_by(|a, b| {
        let ordering = compare_keys(field.key(a), field.key(b));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_keys(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::generator::generate_tokens;
    use crate::types::FilterPreset;

    fn tokens_with<F: Fn(&mut Token, usize)>(count: usize, set: F) -> Vec<Token> {
        let mut tokens = generate_tokens(count);
        for (i, token) in tokens.iter_mut().enumerate() {
            set(token, i);
        }
        tokens
    }

    fn ids(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_dev_percent_filter_keeps_order() {
        let values = [2.0, 7.0, 50.0];
        let tokens = tokens_with(3, |t, i| t.dev_percent = values[i]);
        let filters = FilterConfig {
            dev_percent_max: Some(10.0),
            ..FilterConfig::default()
        };

        let sort = SortConfig::new(SortField::Unknown, SortDirection::Ascending);
        let view = query_view(&tokens, &filters, &sort);
        assert_eq!(ids(&view), vec![tokens[0].id.clone(), tokens[1].id.clone()]);
    }

    #[test]
    fn test_market_cap_sort_both_directions() {
        let caps = [300.0, 100.0, 200.0];
        let tokens = tokens_with(3, |t, i| t.market_cap = caps[i]);

        let asc = query_view(
            &tokens,
            &FilterConfig::default(),
            &SortConfig::new(SortField::MarketCap, SortDirection::Ascending),
        );
        let asc_caps: Vec<f64> = asc.iter().map(|t| t.market_cap).collect();
        assert_eq!(asc_caps, vec![100.0, 200.0, 300.0]);

        let desc = query_view(
            &tokens,
            &FilterConfig::default(),
            &SortConfig::new(SortField::MarketCap, SortDirection::Descending),
        );
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn test_sort_is_stable() {
        let holders = [5, 1, 5, 1];
        let tokens = tokens_with(4, |t, i| t.holders = holders[i]);

        let asc = query_view(
            &tokens,
            &FilterConfig::default(),
            &SortConfig::new(SortField::Holders, SortDirection::Ascending),
        );
        assert_eq!(
            ids(&asc),
            ids(&[tokens[1].clone(), tokens[3].clone(), tokens[0].clone(), tokens[2].clone()])
        );

        let desc = query_view(
            &tokens,
            &FilterConfig::default(),
            &SortConfig::new(SortField::Holders, SortDirection::Descending),
        );
        assert_eq!(
            ids(&desc),
            ids(&[tokens[0].clone(), tokens[2].clone(), tokens[1].clone(), tokens[3].clone()])
        );
    }

    #[test]
    fn test_unknown_field_keeps_input_order() {
        let tokens = generate_tokens(6);
        let view = query_view(
            &tokens,
            &FilterConfig::default(),
            &SortConfig::new(SortField::Unknown, SortDirection::Descending),
        );
        assert_eq!(view, tokens);
    }

    #[test]
    fn test_age_max_is_minutes() {
        let ages = [30, 300, 301, 4000];
        let tokens = tokens_with(4, |t, i| t.age_seconds = ages[i]);
        let filters = FilterConfig {
            age_max: Some(5.0),
            ..FilterConfig::default()
        };

        let view = query_view(&tokens, &filters, &SortConfig::default());
        let kept: Vec<u64> = view.iter().map(|t| t.age_seconds).collect();
        assert_eq!(kept, vec![30, 300]);
    }

    #[test]
    fn test_filters_compose() {
        let tokens = tokens_with(4, |t, i| {
            t.holders = [50, 150, 150, 150][i];
            t.market_cap = [1e6, 1e6, 1e3, 1e6][i];
            t.sniper_percent = [0.0, 0.0, 0.0, 80.0][i];
        });
        let filters = FilterConfig {
            holders_min: Some(100.0),
            market_cap_min: Some(10_000.0),
            sniper_percent_max: Some(50.0),
            ..FilterConfig::default()
        };

        let view = query_view(&tokens, &filters, &SortConfig::default());
        assert_eq!(ids(&view), vec![tokens[1].id.clone()]);
    }

    #[test]
    fn test_reserved_filters_do_not_narrow() {
        let tokens = generate_tokens(5);
        let filters = FilterConfig {
            age_min: Some(1e9),
            holders_max: Some(0.0),
            market_cap_max: Some(0.0),
            volume_min: Some(1e12),
            volume_max: Some(0.0),
            ..FilterConfig::default()
        };
        assert_eq!(query_view(&tokens, &filters, &SortConfig::default()).len(), 5);
    }

    #[test]
    fn test_preset_filter() {
        let tokens = tokens_with(3, |t, i| {
            t.dev_percent = [1.0, 1.0, 9.0][i];
            t.bundled_percent = [4.0, 6.0, 1.0][i];
        });
        let view = query_view(
            &tokens,
            &FilterConfig::preset(FilterPreset::P1),
            &SortConfig::default(),
        );
        assert_eq!(ids(&view), vec![tokens[0].id.clone()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(query_view(&[], &FilterConfig::default(), &SortConfig::default()).is_empty());
    }
}
