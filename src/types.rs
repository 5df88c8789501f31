use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_LOOKBACK_DAYS, DEFAULT_MIN_SAMPLES, DEFAULT_TOP_N};

// ---------------------------------------------------------------------------
// Quantity tier
// ---------------------------------------------------------------------------

/// Lot size a price applies to. Closed set; the integer encoding is tier
/// identity only, never a scaling factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum QuantityTier {
    One,
    Ten,
    Hundred,
    Thousand,
}

impl QuantityTier {
    pub fn as_i64(self) -> i64 {
        match self {
            QuantityTier::One => 1,
            QuantityTier::Ten => 10,
            QuantityTier::Hundred => 100,
            QuantityTier::Thousand => 1000,
        }
    }
}

impl TryFrom<i64> for QuantityTier {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(QuantityTier::One),
            10 => Ok(QuantityTier::Ten),
            100 => Ok(QuantityTier::Hundred),
            1000 => Ok(QuantityTier::Thousand),
            other => Err(format!("invalid quantity tier: {other}")),
        }
    }
}

impl From<QuantityTier> for i64 {
    fn from(t: QuantityTier) -> i64 {
        t.as_i64()
    }
}

impl std::fmt::Display for QuantityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

// ---------------------------------------------------------------------------
// Price sample
// ---------------------------------------------------------------------------

/// One observed market price. Immutable once stored; `price == None` means
/// the listing was seen unpriced and is excluded from every statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub gid: i64,
    pub quantity: QuantityTier,
    pub price: Option<i64>,
    /// UTC epoch seconds.
    pub recorded_at: i64,
    pub server_id: i64,
}

// ---------------------------------------------------------------------------
// Ranking scope
// ---------------------------------------------------------------------------

/// Scope shared by both ranking engines. Category/type filters are ANDed
/// together and with the server/tier/window filters.
#[derive(Debug, Clone)]
pub struct RankingFilter {
    pub server_id: i64,
    /// None = pool samples across all tiers (union, not intersection).
    pub quantity: Option<QuantityTier>,
    pub lookback_days: i64,
    pub min_samples: usize,
    pub top_n: usize,
    pub category: Option<i64>,
    pub type_id: Option<i64>,
}

impl RankingFilter {
    pub fn new(server_id: i64) -> Self {
        Self {
            server_id,
            quantity: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            min_samples: DEFAULT_MIN_SAMPLES,
            top_n: DEFAULT_TOP_N,
            category: None,
            type_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resell evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Buy,
    Consider,
    Avoid,
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecommendedAction::Buy => "buy",
            RecommendedAction::Consider => "consider",
            RecommendedAction::Avoid => "avoid",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationReason {
    NoData,
    NotEnoughSamples,
    PriceLowAndHistoryShowsHigherSales,
    NotAGoodMargin,
}

impl std::fmt::Display for EvaluationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvaluationReason::NoData => "no_data",
            EvaluationReason::NotEnoughSamples => "not_enough_samples",
            EvaluationReason::PriceLowAndHistoryShowsHigherSales => {
                "price_low_and_history_shows_higher_sales"
            }
            EvaluationReason::NotAGoodMargin => "not_a_good_margin",
        };
        write!(f, "{s}")
    }
}

/// Verdict of the buy-to-resell heuristic for one observed price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub gid: i64,
    pub observed_price: i64,
    pub is_low: bool,
    pub avg_price: Option<f64>,
    pub median_price: Option<f64>,
    pub samples: usize,
    pub fraction_higher: f64,
    pub recommended_action: RecommendedAction,
    pub reason: EvaluationReason,
}

// ---------------------------------------------------------------------------
// Ranking results
// ---------------------------------------------------------------------------

/// One row of the resale ranking, monetary/percentage fields rounded to
/// 2 decimals (sorting happens on full precision upstream).
#[derive(Debug, Clone, Serialize)]
pub struct ItemRanking {
    pub gid: i64,
    pub name: String,
    pub avg_price: f64,
    pub min_price: i64,
    pub max_price: i64,
    pub volatility: f64,
    pub profit_potential: f64,
    pub profit_margin_pct: f64,
    pub profitability_score: f64,
    pub samples: usize,
}

/// Per-ingredient line of a craft ranking breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientCost {
    pub gid: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// One row of the craft ranking, sorted by absolute profit.
#[derive(Debug, Clone, Serialize)]
pub struct CraftRanking {
    pub gid: i64,
    pub name: String,
    pub sell_price: f64,
    pub craft_cost: f64,
    pub profit: f64,
    pub profit_margin_pct: f64,
    pub ingredients: Vec<IngredientCost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_through_integer_encoding() {
        for tier in [
            QuantityTier::One,
            QuantityTier::Ten,
            QuantityTier::Hundred,
            QuantityTier::Thousand,
        ] {
            assert_eq!(QuantityTier::try_from(tier.as_i64()), Ok(tier));
        }
    }

    #[test]
    fn tier_rejects_non_tier_integers() {
        assert!(QuantityTier::try_from(0).is_err());
        assert!(QuantityTier::try_from(50).is_err());
        assert!(QuantityTier::try_from(-1).is_err());
    }

    #[test]
    fn reason_serializes_snake_case() {
        let s = serde_json::to_string(&EvaluationReason::PriceLowAndHistoryShowsHigherSales)
            .unwrap();
        assert_eq!(s, "\"price_low_and_history_shows_higher_sales\"");
    }
}
