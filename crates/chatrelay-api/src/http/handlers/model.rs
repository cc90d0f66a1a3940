//! Model listing handler.
//!
//! GET /api/v1/models - List models available on the upstream engine.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use chatrelay_types::llm::ModelInfo;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/models - List upstream models. Upstream failures map to
/// 502 Bad Gateway.
pub async fn list_models(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<ModelInfo>>>, AppError> {
    let start = Instant::now();

    let models = state.upstream.list_models().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(models, elapsed)))
}
