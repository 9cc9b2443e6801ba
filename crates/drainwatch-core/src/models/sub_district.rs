use serde::{Deserialize, Serialize};

use super::geometry::LngLat;

/// Unique identifier for a sub-district
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubDistrictId(pub i64);

/// Administrative boundary used for report routing and regional filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDistrict {
    /// Unique identifier
    pub id: SubDistrictId,

    /// Name, unique across sub-districts and used as the natural key
    pub name: String,

    /// Boundary rings in storage order; the first ring is the outer boundary
    pub boundary: Vec<Vec<LngLat>>,
}

