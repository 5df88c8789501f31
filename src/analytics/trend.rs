//! Single-item trend helpers: windowed average price and the percentage
//! move between the two most recent sightings.

use crate::analytics::{mean_price, round2};
use crate::types::PriceSample;

/// Mean of the priced history, `None` when the window holds nothing.
pub fn average_price(prices: &[i64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(round2(mean_price(prices)))
}

/// Percentage change between the two most recent priced samples.
/// Undefined below two samples. Input order does not matter; the two
/// latest `recorded_at` values are compared.
pub fn last_change_pct(samples: &[PriceSample]) -> Option<f64> {
    let mut priced: Vec<(i64, i64)> = samples
        .iter()
        .filter_map(|s| s.price.map(|p| (s.recorded_at, p)))
        .collect();
    if priced.len() < 2 {
        return None;
    }
    priced.sort_by_key(|&(recorded_at, _)| recorded_at);
    let (_, prev) = priced[priced.len() - 2];
    let (_, last) = priced[priced.len() - 1];
    Some(round2((last - prev) as f64 / prev as f64 * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuantityTier;

    fn sample(price: Option<i64>, recorded_at: i64) -> PriceSample {
        PriceSample {
            gid: 1,
            quantity: QuantityTier::Hundred,
            price,
            recorded_at,
            server_id: 1,
        }
    }

    #[test]
    fn average_price_empty_window_is_none() {
        assert_eq!(average_price(&[]), None);
        assert_eq!(average_price(&[100, 200]), Some(150.0));
    }

    #[test]
    fn last_change_compares_two_most_recent() {
        let samples = vec![
            sample(Some(100), 10),
            sample(Some(50), 5),
            sample(Some(120), 20),
        ];
        // 100 -> 120 = +20%.
        assert_eq!(last_change_pct(&samples), Some(20.0));
    }

    #[test]
    fn last_change_skips_unpriced_and_needs_two() {
        let samples = vec![sample(Some(100), 10), sample(None, 20)];
        assert_eq!(last_change_pct(&samples), None);

        let samples = vec![
            sample(Some(100), 10),
            sample(None, 20),
            sample(Some(80), 30),
        ];
        assert_eq!(last_change_pct(&samples), Some(-20.0));
    }
}
