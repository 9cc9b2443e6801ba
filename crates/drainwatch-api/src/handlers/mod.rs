mod areas;
mod dashboard;
mod drainage;
mod health;
mod links;
mod reports;

pub use areas::{flood_zones_at, list_flood_zones, resolve_sub_district};
pub use dashboard::dashboard_stats;
pub use drainage::{
    delete_segment, list_segments, nearby_segments, set_segment_condition, suggest_segments,
};
pub use health::health_check;
pub use links::{fix_link, fix_link_form};
pub use reports::{
    delete_report, get_report, list_reports, set_report_status, submit_report, submit_report_form,
    update_associations, update_report, update_report_form,
};
