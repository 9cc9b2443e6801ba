use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{FloodZoneResponse, PointQuery, RegionQuery, SubDistrictResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn resolve_sub_district(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<SubDistrictResponse>, ApiError> {
    let name = state.service.resolve_sub_district(query.point()).await?;
    Ok(Json(SubDistrictResponse { name }))
}

pub async fn flood_zones_at(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<Vec<FloodZoneResponse>>, ApiError> {
    let zones = state.service.flood_zones_at(query.point()).await?;
    Ok(Json(zones.into_iter().map(FloodZoneResponse::from).collect()))
}

pub async fn list_flood_zones(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<Vec<FloodZoneResponse>>, ApiError> {
    let zones = state.service.list_flood_zones(query.sub_district.as_deref()).await?;
    Ok(Json(zones.into_iter().map(FloodZoneResponse::from).collect()))
}
