use drainwatch_core::models::{
    Condition, DrainageSegment, FloodZone, LatLng, Report, ReportDrainageLink, ReportId,
};
use drainwatch_workflow::{DrainageService, ReportDetail};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "drainwatch-api" }
    }
}

/// Report with presentation fields
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    /// The report point, latitude first
    pub location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl ReportResponse {
    pub fn new(report: Report, service: &DrainageService) -> Self {
        let attachment_url = report.attachment.as_deref().map(|p| service.attachment_url(p));
        Self { location: report.point.into(), attachment_url, report }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    #[serde(flatten)]
    pub link: ReportDrainageLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_location: Option<LatLng>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_attachment_url: Option<String>,
}

impl LinkResponse {
    pub fn new(link: ReportDrainageLink, service: &DrainageService) -> Self {
        let remediation_attachment_url =
            link.remediation_attachment.as_deref().map(|p| service.attachment_url(p));
        Self {
            remediation_location: link.remediation_point.map(LatLng::from),
            remediation_attachment_url,
            link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportDetailResponse {
    pub report: ReportResponse,
    pub links: Vec<LinkResponse>,
}

impl ReportDetailResponse {
    pub fn new(detail: ReportDetail, service: &DrainageService) -> Self {
        Self {
            report: ReportResponse::new(detail.report, service),
            links: detail.links.into_iter().map(|l| LinkResponse::new(l, service)).collect(),
        }
    }
}

/// A line segment close enough to a point to be matched
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub id: i64,
    pub name: String,
    pub condition: Condition,
    pub distance_meters: f64,
}

impl From<(DrainageSegment, f64)> for SuggestionResponse {
    fn from((segment, distance_meters): (DrainageSegment, f64)) -> Self {
        Self { id: segment.id.0, name: segment.name, condition: segment.condition, distance_meters }
    }
}

#[derive(Debug, Serialize)]
pub struct SubDistrictResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FloodZoneResponse {
    #[serde(flatten)]
    pub zone: FloodZone,
    /// Zone center, latitude first
    pub location: LatLng,
}

impl From<FloodZone> for FloodZoneResponse {
    fn from(zone: FloodZone) -> Self {
        Self { location: zone.center.into(), zone }
    }
}

/// Delete operation response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn success(entity: &str, id: i64) -> Self {
        Self { success: true, message: format!("Successfully deleted {} {}", entity, id) }
    }
}

/// Segment deletion response, listing reports whose status was recomputed
#[derive(Debug, Serialize)]
pub struct SegmentDeletedResponse {
    #[serde(flatten)]
    pub result: DeleteResponse,
    pub affected_reports: Vec<ReportId>,
}
