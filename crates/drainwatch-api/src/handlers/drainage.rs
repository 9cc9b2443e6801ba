use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use drainwatch_core::models::{Condition, SegmentId};
use geojson::FeatureCollection;

use crate::actor::actor_from_headers;
use crate::dto::{
    segments_to_feature_collection, ConditionRequest, DeleteResponse, NearbyQuery, PointQuery,
    RegionQuery, SegmentDeletedResponse, SuggestionResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_segments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let segments = state.service.list_segments(query.sub_district.as_deref()).await?;
    Ok(Json(segments_to_feature_collection(&segments)))
}

pub async fn nearby_segments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let segments = state.service.nearby(query.lat, query.lng, query.radius_km).await?;
    Ok(Json(segments_to_feature_collection(&segments)))
}

pub async fn suggest_segments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<Vec<SuggestionResponse>>, ApiError> {
    let matches = state.service.suggest_segments(query.point()).await?;
    Ok(Json(matches.into_iter().map(SuggestionResponse::from).collect()))
}

pub async fn delete_segment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(segment_id): Path<i64>,
) -> Result<Json<SegmentDeletedResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let affected_reports = state.service.delete_segment(&actor, SegmentId(segment_id)).await?;
    Ok(Json(SegmentDeletedResponse {
        result: DeleteResponse::success("drainage segment", segment_id),
        affected_reports,
    }))
}

pub async fn set_segment_condition(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(segment_id): Path<i64>,
    Json(request): Json<ConditionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let condition: Condition = request.condition.parse()?;

    state.service.set_segment_condition(&actor, SegmentId(segment_id), condition).await?;
    Ok(Json(serde_json::json!({ "id": segment_id, "condition": condition })))
}
