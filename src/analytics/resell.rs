//! Buy-to-resell heuristic: given one item's recent priced history and an
//! observed listing price, decide whether buying it back for resale is
//! attractive.

use crate::analytics::{mean_price, median_price, round2};
use crate::config::{resell_defaults, DEFAULT_MIN_SAMPLES};
use crate::types::{EvaluationReason, EvaluationResult, RecommendedAction};

#[derive(Debug, Clone, Copy)]
pub struct ResellParams {
    pub low_ratio: f64,
    pub min_samples: usize,
    pub fraction_higher_needed: f64,
}

impl Default for ResellParams {
    fn default() -> Self {
        Self {
            low_ratio: resell_defaults::LOW_RATIO,
            min_samples: DEFAULT_MIN_SAMPLES,
            fraction_higher_needed: resell_defaults::FRACTION_HIGHER_NEEDED,
        }
    }
}

/// Total function over the fetched history: every degenerate input maps
/// to a structured verdict, never an error.
///
/// `prices` is the item's priced history inside the caller's scope
/// (server, lookback window, tier or pooled tiers).
pub fn evaluate_resell(
    gid: i64,
    prices: &[i64],
    observed_price: i64,
    params: &ResellParams,
) -> EvaluationResult {
    let samples = prices.len();
    if samples == 0 {
        return EvaluationResult {
            gid,
            observed_price,
            is_low: false,
            avg_price: None,
            median_price: None,
            samples: 0,
            fraction_higher: 0.0,
            recommended_action: RecommendedAction::Avoid,
            reason: EvaluationReason::NoData,
        };
    }

    let avg = mean_price(prices);
    let median = median_price(prices);
    let higher = prices.iter().filter(|&&p| p > observed_price).count();
    let fraction_higher = higher as f64 / samples as f64;

    let is_low_by_ratio = observed_price as f64 <= avg * params.low_ratio;
    let has_enough_samples = samples >= params.min_samples;
    let sells_higher_often = fraction_higher >= params.fraction_higher_needed;
    let is_low = is_low_by_ratio && has_enough_samples && sells_higher_often;

    // First match wins: thin history caps the verdict at "consider" even
    // when the ratio and fraction gates would pass.
    let (recommended_action, reason) = if !has_enough_samples {
        (RecommendedAction::Consider, EvaluationReason::NotEnoughSamples)
    } else if is_low {
        (
            RecommendedAction::Buy,
            EvaluationReason::PriceLowAndHistoryShowsHigherSales,
        )
    } else {
        (RecommendedAction::Avoid, EvaluationReason::NotAGoodMargin)
    };

    EvaluationResult {
        gid,
        observed_price,
        is_low,
        avg_price: Some(round2(avg)),
        median_price: median.map(round2),
        samples,
        fraction_higher,
        recommended_action,
        reason,
    }
}
