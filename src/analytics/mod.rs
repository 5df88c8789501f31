//! The analytics engine: pure, stateless computations over price samples
//! already materialized from the store. Callers fetch a scope, the
//! functions here partition, aggregate and rank in memory.

pub mod rank_crafts;
pub mod rank_items;
pub mod resell;
pub mod speed;
pub mod trend;

use std::time::{SystemTime, UNIX_EPOCH};

use statrs::statistics::Statistics;

use crate::types::PriceSample;

pub const SECS_PER_DAY: i64 = 86_400;

pub fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Start of a trailing window of `days` days ending at `now`.
pub fn window_start(now: i64, days: i64) -> i64 {
    now - days * SECS_PER_DAY
}

/// Partitions priced samples by gid, preserving both the encounter order
/// of gids and the time order of each partition (the store fetch is
/// already sorted by `recorded_at`).
pub(crate) fn group_prices_by_gid(samples: &[PriceSample]) -> Vec<(i64, Vec<i64>)> {
    let mut index: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();
    let mut groups: Vec<(i64, Vec<i64>)> = Vec::new();
    for sample in samples {
        let Some(price) = sample.price else { continue };
        match index.get(&sample.gid) {
            Some(&i) => groups[i].1.push(price),
            None => {
                index.insert(sample.gid, groups.len());
                groups.push((sample.gid, vec![price]));
            }
        }
    }
    groups
}

pub(crate) fn mean_price(prices: &[i64]) -> f64 {
    prices.iter().map(|&p| p as f64).mean()
}

/// Median of the sorted prices: middle element for odd counts, average of
/// the two middle elements for even counts.
pub(crate) fn median_price(prices: &[i64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    };
    Some(median)
}

/// Reported monetary/percentage values carry 2 decimals; sorting always
/// happens on full precision before this is applied.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuantityTier;

    fn sample(gid: i64, price: Option<i64>, recorded_at: i64) -> PriceSample {
        PriceSample {
            gid,
            quantity: QuantityTier::Hundred,
            price,
            recorded_at,
            server_id: 1,
        }
    }

    #[test]
    fn grouping_preserves_encounter_order_and_skips_unpriced() {
        let samples = vec![
            sample(5, Some(10), 1),
            sample(3, Some(20), 2),
            sample(5, None, 3),
            sample(5, Some(30), 4),
            sample(9, Some(40), 5),
        ];
        let groups = group_prices_by_gid(&samples);
        assert_eq!(
            groups,
            vec![(5, vec![10, 30]), (3, vec![20]), (9, vec![40])]
        );
    }

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(median_price(&[3, 1, 2]), Some(2.0));
        assert_eq!(median_price(&[4, 1, 3, 2]), Some(2.5));
        assert_eq!(median_price(&[]), None);
    }

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(70.71067811), 70.71);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.005), 0.01);
    }
}
