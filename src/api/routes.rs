use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::analytics::rank_crafts::rank_crafts;
use crate::analytics::rank_items::rank_items;
use crate::analytics::resell::{evaluate_resell, ResellParams};
use crate::analytics::speed::sales_speed;
use crate::analytics::trend;
use crate::analytics::{now_ts, window_start};
use crate::api::health::get_health;
use crate::catalog::Catalog;
use crate::config::{
    resell_defaults, AVG_PRICE_DEFAULT_DAYS, DEFAULT_LOOKBACK_DAYS, DEFAULT_MIN_SAMPLES,
    SAMPLE_BATCH_SIZE,
};
use crate::db::{NewSample, SampleScope, SampleStore};
use crate::error::AppError;
use crate::types::{
    CraftRanking, EvaluationResult, ItemRanking, QuantityTier, RankingFilter,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: SampleStore,
    pub catalog: Arc<Catalog>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/samples/bulk_insert", post(bulk_insert))
        .route("/samples/sales_speed", get(get_sales_speed))
        .route("/samples/evolution", get(get_evolution))
        .route("/samples/avg_price", get(get_avg_price))
        .route("/samples/last_change", get(get_last_change))
        .route("/analytics/resell", get(get_resell_evaluation))
        .route("/analytics/top_items", get(get_top_items))
        .route("/analytics/top_crafts", get(get_top_crafts))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Payload / query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SamplePayload {
    pub gid: i64,
    pub quantity: QuantityTier,
    pub price: Option<i64>,
    /// UTC epoch seconds; defaults to the server clock.
    pub recorded_at: Option<i64>,
    pub server_id: i64,
}

#[derive(Deserialize)]
pub struct SalesSpeedQuery {
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
    /// Comma-separated candidate gid set.
    pub gids: Option<String>,
}

#[derive(Deserialize)]
pub struct EvolutionQuery {
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
    pub type_id: Option<i64>,
    pub gid: Option<i64>,
}

#[derive(Deserialize)]
pub struct AvgPriceQuery {
    pub gid: i64,
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
    pub days: Option<i64>,
}

#[derive(Deserialize)]
pub struct LastChangeQuery {
    pub gid: i64,
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
}

#[derive(Deserialize)]
pub struct ResellQuery {
    pub gid: i64,
    pub observed_price: i64,
    pub server_id: i64,
    /// Absent = pool samples across all tiers.
    pub quantity: Option<QuantityTier>,
    pub lookback_days: Option<i64>,
    pub low_ratio: Option<f64>,
    pub min_samples: Option<usize>,
    pub fraction_higher_needed: Option<f64>,
}

#[derive(Deserialize)]
pub struct RankingQuery {
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
    pub lookback_days: Option<i64>,
    pub min_samples: Option<usize>,
    pub top_n: Option<usize>,
    pub category: Option<i64>,
    pub type_id: Option<i64>,
}

impl RankingQuery {
    fn into_filter(self) -> RankingFilter {
        let mut filter = RankingFilter::new(self.server_id);
        filter.quantity = self.quantity;
        filter.category = self.category;
        filter.type_id = self.type_id;
        if let Some(days) = self.lookback_days {
            filter.lookback_days = days;
        }
        if let Some(min_samples) = self.min_samples {
            filter.min_samples = min_samples;
        }
        if let Some(top_n) = self.top_n {
            filter.top_n = top_n;
        }
        filter
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct EvolutionPoint {
    pub name: String,
    pub quantity: QuantityTier,
    pub price: i64,
    pub recorded_at: i64,
    pub server_id: i64,
}

#[derive(Serialize)]
pub struct AvgPriceResponse {
    pub gid: i64,
    pub avg_price: Option<f64>,
    pub samples: usize,
}

#[derive(Serialize)]
pub struct LastChangeResponse {
    pub gid: i64,
    pub change_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn bulk_insert(
    State(state): State<ApiState>,
    Json(payloads): Json<Vec<SamplePayload>>,
) -> Result<StatusCode, AppError> {
    if payloads.len() != SAMPLE_BATCH_SIZE {
        return Err(AppError::Validation(format!(
            "expected exactly {SAMPLE_BATCH_SIZE} samples per batch, got {}",
            payloads.len()
        )));
    }

    let now = now_ts();
    let mut batch = Vec::with_capacity(payloads.len());
    for p in payloads {
        if matches!(p.price, Some(price) if price <= 0) {
            return Err(AppError::Validation(
                "price must be positive when present".to_string(),
            ));
        }
        batch.push(NewSample {
            gid: p.gid,
            quantity: p.quantity,
            price: p.price,
            recorded_at: p.recorded_at.unwrap_or(now),
            server_id: p.server_id,
        });
    }

    state.store.insert_batch(&batch).await?;
    Ok(StatusCode::CREATED)
}

async fn get_sales_speed(
    State(state): State<ApiState>,
    Query(params): Query<SalesSpeedQuery>,
) -> Result<Json<HashMap<i64, f64>>, AppError> {
    let quantity = params.quantity.unwrap_or(QuantityTier::Hundred);
    let candidates = params.gids.as_deref().map(parse_gid_list).transpose()?;

    // Speed reads the full stored history for the tier/server scope.
    let scope = SampleScope::server(params.server_id).quantity(Some(quantity));
    let samples = state.store.fetch_priced(&scope).await?;
    Ok(Json(sales_speed(&samples, candidates.as_ref())))
}

async fn get_evolution(
    State(state): State<ApiState>,
    Query(params): Query<EvolutionQuery>,
) -> Result<Json<Vec<EvolutionPoint>>, AppError> {
    let quantity = params.quantity.unwrap_or(QuantityTier::Hundred);
    let scope = SampleScope::server(params.server_id).quantity(Some(quantity));

    let samples = match (params.gid, params.type_id) {
        (Some(gid), _) => state.store.fetch_priced(&scope.gid(gid)).await?,
        (None, Some(type_id)) => {
            let of_type: HashSet<i64> = state.catalog.gids_of_type(type_id).into_iter().collect();
            state
                .store
                .fetch_priced(&scope)
                .await?
                .into_iter()
                .filter(|s| of_type.contains(&s.gid))
                .collect()
        }
        (None, None) => {
            return Err(AppError::Validation(
                "either gid or type_id is required".to_string(),
            ))
        }
    };

    let points = samples
        .into_iter()
        .filter_map(|s| {
            let price = s.price?;
            Some(EvolutionPoint {
                name: state.catalog.display_name(s.gid),
                quantity: s.quantity,
                price,
                recorded_at: s.recorded_at,
                server_id: s.server_id,
            })
        })
        .collect();
    Ok(Json(points))
}

async fn get_avg_price(
    State(state): State<ApiState>,
    Query(params): Query<AvgPriceQuery>,
) -> Result<Json<AvgPriceResponse>, AppError> {
    let quantity = params.quantity.unwrap_or(QuantityTier::Hundred);
    let days = params.days.unwrap_or(AVG_PRICE_DEFAULT_DAYS);
    let scope = SampleScope::server(params.server_id)
        .quantity(Some(quantity))
        .since(window_start(now_ts(), days))
        .gid(params.gid);

    let samples = state.store.fetch_priced(&scope).await?;
    let prices: Vec<i64> = samples.iter().filter_map(|s| s.price).collect();
    Ok(Json(AvgPriceResponse {
        gid: params.gid,
        avg_price: trend::average_price(&prices),
        samples: prices.len(),
    }))
}

async fn get_last_change(
    State(state): State<ApiState>,
    Query(params): Query<LastChangeQuery>,
) -> Result<Json<LastChangeResponse>, AppError> {
    let quantity = params.quantity.unwrap_or(QuantityTier::Hundred);
    let scope = SampleScope::server(params.server_id)
        .quantity(Some(quantity))
        .gid(params.gid);

    let samples = state.store.fetch_priced(&scope).await?;
    Ok(Json(LastChangeResponse {
        gid: params.gid,
        change_pct: trend::last_change_pct(&samples),
    }))
}

async fn get_resell_evaluation(
    State(state): State<ApiState>,
    Query(params): Query<ResellQuery>,
) -> Result<Json<EvaluationResult>, AppError> {
    if params.observed_price <= 0 {
        return Err(AppError::Validation(
            "observed_price must be positive".to_string(),
        ));
    }

    let lookback_days = params.lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
    let scope = SampleScope::server(params.server_id)
        .quantity(params.quantity)
        .since(window_start(now_ts(), lookback_days))
        .gid(params.gid);

    let samples = state.store.fetch_priced(&scope).await?;
    let prices: Vec<i64> = samples.iter().filter_map(|s| s.price).collect();

    let resell_params = ResellParams {
        low_ratio: params.low_ratio.unwrap_or(resell_defaults::LOW_RATIO),
        min_samples: params.min_samples.unwrap_or(DEFAULT_MIN_SAMPLES),
        fraction_higher_needed: params
            .fraction_higher_needed
            .unwrap_or(resell_defaults::FRACTION_HIGHER_NEEDED),
    };
    Ok(Json(evaluate_resell(
        params.gid,
        &prices,
        params.observed_price,
        &resell_params,
    )))
}

async fn get_top_items(
    State(state): State<ApiState>,
    Query(params): Query<RankingQuery>,
) -> Result<Json<Vec<ItemRanking>>, AppError> {
    let filter = params.into_filter();
    let scope = SampleScope::server(filter.server_id)
        .quantity(filter.quantity)
        .since(window_start(now_ts(), filter.lookback_days));

    let samples = state.store.fetch_priced(&scope).await?;
    Ok(Json(rank_items(&samples, &state.catalog, &filter)))
}

async fn get_top_crafts(
    State(state): State<ApiState>,
    Query(params): Query<RankingQuery>,
) -> Result<Json<Vec<CraftRanking>>, AppError> {
    let filter = params.into_filter();
    let scope = SampleScope::server(filter.server_id)
        .quantity(filter.quantity)
        .since(window_start(now_ts(), filter.lookback_days));

    let samples = state.store.fetch_priced(&scope).await?;
    Ok(Json(rank_crafts(&samples, &state.catalog, &filter)))
}

fn parse_gid_list(raw: &str) -> Result<HashSet<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::Validation(format!("invalid gid: {s}")))
        })
        .collect()
}
