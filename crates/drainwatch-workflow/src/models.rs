use drainwatch_core::models::{LinkId, Report, ReportDrainageLink, ReportId, ReportStatus, SegmentId};
use serde::Serialize;

/// Result of marking a remediation link fixed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FixOutcome {
    /// The link was already fixed; nothing changed
    AlreadyFixed { link: LinkId },
    Applied {
        segment: Option<SegmentId>,
        /// Every link moved to Fixed, the requested one first
        fixed_links: Vec<LinkId>,
        /// Status of every report touched by the fix, after recomputation
        reports: Vec<(ReportId, ReportStatus)>,
    },
}

/// A report together with its remediation links
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetail {
    pub report: Report,
    pub links: Vec<ReportDrainageLink>,
}
