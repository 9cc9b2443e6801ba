use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use drainwatch_core::models::{LinkId, RemediationInput};
use drainwatch_core::ports::Upload;
use drainwatch_workflow::FixOutcome;

use crate::actor::actor_from_headers;
use crate::dto::FixLinkRequest;
use crate::error::ApiError;
use crate::services::read_form;
use crate::state::AppState;

/// Mark a remediation link fixed; the fix fans out to every pending link on the segment
pub async fn fix_link(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(link_id): Path<i64>,
    Json(request): Json<FixLinkRequest>,
) -> Result<Json<FixOutcome>, ApiError> {
    fix(&state, &headers, link_id, request, None).await
}

pub async fn fix_link_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(link_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<FixOutcome>, ApiError> {
    let form = read_form::<FixLinkRequest>(&mut multipart).await?;
    fix(&state, &headers, link_id, form.payload, form.attachment).await
}

async fn fix(
    state: &AppState,
    headers: &HeaderMap,
    link_id: i64,
    request: FixLinkRequest,
    attachment: Option<Upload>,
) -> Result<Json<FixOutcome>, ApiError> {
    let actor = actor_from_headers(headers)?;
    tracing::info!(link_id, has_attachment = attachment.is_some(), "Fixing remediation link");

    let input = RemediationInput { point: request.location.into(), attachment };
    let outcome = state.service.mark_link_fixed(&actor, LinkId(link_id), input).await?;
    Ok(Json(outcome))
}
