use serde::{Deserialize, Serialize};

use super::geometry::LngLat;
use super::sub_district::SubDistrictId;

/// Unique identifier for a flood zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FloodZoneId(pub i64);

/// A circular flood-risk area. Not coupled to the remediation workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodZone {
    pub id: FloodZoneId,
    pub name: String,
    pub center: LngLat,
    pub radius_meters: f64,
    pub sub_district_id: Option<SubDistrictId>,
}
