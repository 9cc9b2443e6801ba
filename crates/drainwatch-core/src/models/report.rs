use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::actor::{Actor, UserId};
use super::drainage::SegmentId;
use super::geometry::{Geometry, LngLat};
use super::sub_district::SubDistrictId;
use crate::error::DrainError;
use crate::ports::Upload;

/// Unique identifier for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Fixed,
    Aborted,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Fixed => "Fixed",
            ReportStatus::Aborted => "Aborted",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReportStatus::Pending),
            "In Progress" | "InProgress" => Ok(ReportStatus::InProgress),
            "Fixed" => Ok(ReportStatus::Fixed),
            "Aborted" => Ok(ReportStatus::Aborted),
            _ => Err(DrainError::validation("status", format!("unknown report status '{}'", s))),
        }
    }
}

/// Name and contact of an anonymous reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestReporter {
    pub name: String,
    pub contact: String,
}

/// A submitted incident report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub geometry: Geometry,

    /// Representative point in storage order
    pub point: LngLat,

    /// Derived from the point at submission time
    pub sub_district_id: Option<SubDistrictId>,

    pub user_id: Option<UserId>,
    pub guest: Option<GuestReporter>,
    pub attachment: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Whether the actor submitted this report while signed in
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        matches!((self.user_id, actor.user_id), (Some(owner), Some(id)) if owner == id)
    }
}

/// Report row as handed to persistence; the store assigns id, status and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub geometry: Geometry,
    pub point: LngLat,
    pub sub_district_id: Option<SubDistrictId>,
    pub user_id: Option<UserId>,
    pub guest: Option<GuestReporter>,
    pub attachment: Option<String>,
}

/// Inbound report submission
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,

    /// Free-text sub-district name, used when the point lies in no boundary
    pub sub_district_name: Option<String>,

    pub geometry: Option<Geometry>,

    /// Representative point, required
    pub point: Option<LngLat>,

    /// Required when the submitting actor is a guest
    pub guest: Option<GuestReporter>,

    /// Explicit segment associations; `None` lets the matcher decide when enabled
    pub segment_ids: Option<Vec<SegmentId>>,

    pub attachment: Option<Upload>,
}

/// Edit of an existing report's content
#[derive(Debug, Clone, Default)]
pub struct ReportEdit {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub sub_district_name: Option<String>,
    pub geometry: Option<Geometry>,
    pub point: Option<LngLat>,

    /// Replaces the stored attachment when present
    pub attachment: Option<Upload>,

    /// `Some` replaces the segment associations, `None` keeps them
    pub segment_ids: Option<Vec<SegmentId>>,
}

/// Editable columns of a stored report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFields {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub geometry: Geometry,
    pub point: LngLat,
    pub sub_district_id: Option<SubDistrictId>,
    pub attachment: Option<String>,
}

/// Remediation evidence submitted by staff when fixing a segment
#[derive(Debug, Clone)]
pub struct RemediationInput {
    /// Where the fix was applied, in storage order
    pub point: LngLat,
    pub attachment: Option<Upload>,
}
