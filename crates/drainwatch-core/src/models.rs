pub mod actor;
pub mod drainage;
pub mod flood_zone;
pub mod geometry;
pub mod link;
pub mod report;
pub mod stats;
pub mod sub_district;

pub use actor::{Actor, Role, StaffMember, UserId};
pub use drainage::{Condition, DrainageSegment, FunctionClass, SegmentId};
pub use flood_zone::{FloodZone, FloodZoneId};
pub use geometry::{Geometry, GeometryType, LatLng, LngLat};
pub use link::{LinkId, LinkStatus, ReportDrainageLink};
pub use report::{
    GuestReporter, NewReport, RemediationInput, Report, ReportEdit, ReportFields, ReportId,
    ReportStatus, ReportSubmission,
};
pub use stats::{DashboardStats, LATEST_REPORTS};
pub use sub_district::{SubDistrict, SubDistrictId};
