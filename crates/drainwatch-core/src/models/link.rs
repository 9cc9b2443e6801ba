use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::drainage::SegmentId;
use super::geometry::LngLat;
use super::report::ReportId;
use crate::error::DrainError;

/// Unique identifier for a remediation link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub i64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remediation status of a single (report, segment) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LinkStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Fixed,
    Aborted,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Pending => "Pending",
            LinkStatus::InProgress => "In Progress",
            LinkStatus::Fixed => "Fixed",
            LinkStatus::Aborted => "Aborted",
        }
    }

    /// Whether the link still signals a problem on its segment
    pub fn is_open(&self) -> bool {
        *self != LinkStatus::Fixed
    }
}

impl FromStr for LinkStatus {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(LinkStatus::Pending),
            "In Progress" | "InProgress" => Ok(LinkStatus::InProgress),
            "Fixed" => Ok(LinkStatus::Fixed),
            "Aborted" => Ok(LinkStatus::Aborted),
            _ => Err(DrainError::validation("status", format!("unknown link status '{}'", s))),
        }
    }
}

/// Join record between a report and a drainage segment, with its own lifecycle.
///
/// `segment_id` is `None` once the segment was deleted; such a link is
/// detached and no longer takes part in reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDrainageLink {
    pub id: LinkId,
    pub report_id: ReportId,
    pub segment_id: Option<SegmentId>,
    pub status: LinkStatus,

    /// Where the fix was applied, in storage order
    pub remediation_point: Option<LngLat>,

    /// Stored path of the remediation evidence
    pub remediation_attachment: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportDrainageLink {
    pub fn is_active(&self) -> bool {
        self.segment_id.is_some()
    }
}
