use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::report::Report;

/// Number of recent reports shown on the dashboard
pub const LATEST_REPORTS: usize = 5;

/// Aggregate counters for the staff dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_segments: usize,
    pub total_flood_zones: usize,
    pub total_reports: usize,
    pub fixed_reports: usize,
    pub reports_by_status: BTreeMap<String, usize>,
    pub reports_by_category: BTreeMap<String, usize>,
    pub segments_by_condition: BTreeMap<String, usize>,

    /// Most recently submitted reports, newest first
    pub latest_reports: Vec<Report>,
}
