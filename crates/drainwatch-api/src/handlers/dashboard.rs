use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use drainwatch_core::models::DashboardStats;

use crate::actor::actor_from_headers;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.service.dashboard_stats(&actor).await?))
}
