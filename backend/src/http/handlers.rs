//! HTTP handlers for the REST API.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{HealthResponse, ListQuery, PredictionListResponse, ScrapeResponse};
use super::error::AppError;
use super::state::AppState;
use crate::models::Prediction;

pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

/// GET /api/scrape
///
/// Scrape synchronously. The fresh rows also replace the cached results when
/// the cache accepts them; a cache failure does not fail the request.
pub async fn scrape_results(State(state): State<AppState>) -> HandlerResult<ScrapeResponse> {
    let results = state.pipeline.scrape_results().await;
    Ok(Json(ScrapeResponse {
        count: results.len(),
        results,
    }))
}

/// GET /api/predict
///
/// Runs the full pipeline. Predictions made here are cached and emailed but
/// do not join the weekly batch.
pub async fn predict(State(state): State<AppState>) -> HandlerResult<Prediction> {
    let prediction = state.pipeline.run().await.map_err(AppError::Prediction)?;
    Ok(Json(prediction))
}

/// GET /api/predictions/latest
pub async fn latest_prediction(State(state): State<AppState>) -> HandlerResult<Prediction> {
    state
        .pipeline
        .latest_prediction()
        .await
        .map_err(AppError::Cache)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No prediction cached yet".to_string()))
}

/// GET /api/predictions?limit=N
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<PredictionListResponse> {
    let limit = query.limit().map_err(AppError::BadRequest)?;
    let predictions = state.repository.list_recent(limit).await?;
    let total = state.repository.count().await?;
    Ok(Json(PredictionListResponse { predictions, total }))
}
