use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use drainwatch_core::models::{ReportId, ReportStatus, SegmentId};
use drainwatch_core::ports::Upload;

use crate::actor::actor_from_headers;
use crate::dto::{
    AssociationsRequest, DeleteResponse, LinkResponse, ReportDetailResponse, ReportResponse,
    StatusRequest, SubmitReportRequest, UpdateReportRequest,
};
use crate::error::ApiError;
use crate::services::read_form;
use crate::state::AppState;

pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SubmitReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    submit(&state, &headers, request, None).await
}

/// Submission with an attachment, as multipart `payload` + `attachment`
pub async fn submit_report_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    let form = read_form::<SubmitReportRequest>(&mut multipart).await?;
    submit(&state, &headers, form.payload, form.attachment).await
}

async fn submit(
    state: &AppState,
    headers: &HeaderMap,
    request: SubmitReportRequest,
    attachment: Option<Upload>,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    let actor = actor_from_headers(headers)?;
    tracing::info!(
        title = %request.title,
        guest = actor.is_guest(),
        has_attachment = attachment.is_some(),
        "Submitting report"
    );

    let report = state.service.submit_report(&actor, request.into_submission(attachment)).await?;
    Ok((StatusCode::CREATED, Json(ReportResponse::new(report, &state.service))))
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ReportResponse>>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let reports = state.service.list_reports_for(&actor).await?;
    Ok(Json(reports.into_iter().map(|r| ReportResponse::new(r, &state.service)).collect()))
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
) -> Result<Json<ReportDetailResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let detail = state.service.report_detail(&actor, ReportId(report_id)).await?;
    Ok(Json(ReportDetailResponse::new(detail, &state.service)))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
    Json(request): Json<UpdateReportRequest>,
) -> Result<Json<ReportDetailResponse>, ApiError> {
    edit(&state, &headers, report_id, request, None).await
}

/// Edit with a replacement attachment, as multipart `payload` + `attachment`
pub async fn update_report_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ReportDetailResponse>, ApiError> {
    let form = read_form::<UpdateReportRequest>(&mut multipart).await?;
    edit(&state, &headers, report_id, form.payload, form.attachment).await
}

async fn edit(
    state: &AppState,
    headers: &HeaderMap,
    report_id: i64,
    request: UpdateReportRequest,
    attachment: Option<Upload>,
) -> Result<Json<ReportDetailResponse>, ApiError> {
    let actor = actor_from_headers(headers)?;
    tracing::info!(report_id, has_attachment = attachment.is_some(), "Updating report");

    let detail = state
        .service
        .update_report(&actor, ReportId(report_id), request.into_edit(attachment))
        .await?;
    Ok(Json(ReportDetailResponse::new(detail, &state.service)))
}

pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    tracing::info!(report_id, "Deleting report");

    state.service.delete_report(&actor, ReportId(report_id)).await?;
    Ok(Json(DeleteResponse::success("report", report_id)))
}

pub async fn set_report_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let status: ReportStatus = request.status.parse()?;

    let report = state.service.set_report_status(&actor, ReportId(report_id), status).await?;
    Ok(Json(ReportResponse::new(report, &state.service)))
}

pub async fn update_associations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
    Json(request): Json<AssociationsRequest>,
) -> Result<Json<Vec<LinkResponse>>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let segment_ids: Vec<SegmentId> = request.segment_ids.into_iter().map(SegmentId).collect();

    let links = state
        .service
        .update_report_associations(&actor, ReportId(report_id), &segment_ids)
        .await?;
    Ok(Json(links.into_iter().map(|l| LinkResponse::new(l, &state.service)).collect()))
}
