use drainwatch_core::models::{
    Geometry, GuestReporter, LatLng, LngLat, ReportEdit, ReportSubmission, SegmentId,
};
use drainwatch_core::ports::Upload;
use serde::Deserialize;

/// Report submission body.
///
/// `location` is latitude first, as map clients send it; `geometry` is in
/// storage order. When only `location` is given the report is a point.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub sub_district: Option<String>,
    pub geometry: Option<Geometry>,
    pub location: Option<LatLng>,
    pub reporter_name: Option<String>,
    pub reporter_contact: Option<String>,
    #[serde(alias = "drainase_id")]
    pub segment_ids: Option<Vec<i64>>,
}

/// Storage-order point plus geometry, a bare location standing in for a point geometry
fn point_and_geometry(
    location: Option<LatLng>,
    geometry: Option<Geometry>,
) -> (Option<LngLat>, Option<Geometry>) {
    let point = location.map(LngLat::from);
    let geometry = geometry.or_else(|| point.map(|p| Geometry::Point { coordinates: p }));
    (point, geometry)
}

fn segment_ids(ids: Option<Vec<i64>>) -> Option<Vec<SegmentId>> {
    ids.map(|ids| ids.into_iter().map(SegmentId).collect())
}

impl SubmitReportRequest {
    pub fn into_submission(self, attachment: Option<Upload>) -> ReportSubmission {
        let (point, geometry) = point_and_geometry(self.location, self.geometry);
        let guest = match (self.reporter_name, self.reporter_contact) {
            (None, None) => None,
            (name, contact) => Some(GuestReporter {
                name: name.unwrap_or_default(),
                contact: contact.unwrap_or_default(),
            }),
        };

        ReportSubmission {
            title: self.title,
            description: self.description,
            category: self.category,
            location_name: self.location_name,
            sub_district_name: self.sub_district,
            geometry,
            point,
            guest,
            segment_ids: segment_ids(self.segment_ids),
            attachment,
        }
    }
}

/// Report edit body. Leaving out `segment_ids` keeps the current associations.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub sub_district: Option<String>,
    pub geometry: Option<Geometry>,
    pub location: Option<LatLng>,
    #[serde(alias = "drainase_id")]
    pub segment_ids: Option<Vec<i64>>,
}

impl UpdateReportRequest {
    pub fn into_edit(self, attachment: Option<Upload>) -> ReportEdit {
        let (point, geometry) = point_and_geometry(self.location, self.geometry);
        ReportEdit {
            title: self.title,
            description: self.description,
            category: self.category,
            location_name: self.location_name,
            sub_district_name: self.sub_district,
            geometry,
            point,
            attachment,
            segment_ids: segment_ids(self.segment_ids),
        }
    }
}

/// Remediation evidence for fixing a link
#[derive(Debug, Deserialize)]
pub struct FixLinkRequest {
    /// Latitude first
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ConditionRequest {
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct AssociationsRequest {
    #[serde(alias = "drainase_id")]
    pub segment_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
}

impl PointQuery {
    pub fn point(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

/// Optional sub-district filter on listings; `all` or no value lists everything
#[derive(Debug, Default, Deserialize)]
pub struct RegionQuery {
    #[serde(alias = "kecamatan")]
    pub sub_district: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}
