//! Liveness endpoint: proves the store is reachable and reports how much
//! history it holds.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::routes::ApiState;
use crate::error::AppError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub samples: i64,
}

pub async fn get_health(
    State(state): State<ApiState>,
) -> Result<Json<HealthResponse>, AppError> {
    let samples = state.store.sample_count().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        samples,
    }))
}
