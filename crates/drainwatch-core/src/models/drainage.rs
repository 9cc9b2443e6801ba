use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::geometry::Geometry;
use super::sub_district::SubDistrictId;
use crate::error::DrainError;

/// Unique identifier for a drainage segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub i64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hydraulic function class of a drainage channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionClass {
    Primary,
    Secondary,
    Tertiary,
}

impl FunctionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionClass::Primary => "Primary",
            FunctionClass::Secondary => "Secondary",
            FunctionClass::Tertiary => "Tertiary",
        }
    }
}

impl FromStr for FunctionClass {
    type Err = DrainError;

    /// Accepts the English names and the Indonesian labels used by imported inventories
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "primer" => Ok(FunctionClass::Primary),
            "secondary" | "sekunder" => Ok(FunctionClass::Secondary),
            "tertiary" | "tersier" => Ok(FunctionClass::Tertiary),
            _ => Err(DrainError::validation(
                "function_class",
                format!("unknown function class '{}'", s),
            )),
        }
    }
}

/// Derived condition of a drainage segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    #[default]
    Good,
    HasProblem,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Good => "Good",
            Condition::HasProblem => "HasProblem",
        }
    }
}

impl FromStr for Condition {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" | "Baik" => Ok(Condition::Good),
            "HasProblem" | "Terdapat Masalah" => Ok(Condition::HasProblem),
            _ => Err(DrainError::validation("condition", format!("unknown condition '{}'", s))),
        }
    }
}

/// A mapped drainage channel or basin asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainageSegment {
    /// Unique identifier
    pub id: SegmentId,

    /// Display name
    pub name: String,

    /// Function class
    pub function_class: Option<FunctionClass>,

    /// Length in meters
    pub length_meters: Option<f64>,

    /// LineString for channels, Polygon for basins
    pub geometry: Geometry,

    /// Owning sub-district
    pub sub_district_id: Option<SubDistrictId>,

    /// Derived condition, maintained by reconciliation
    pub condition: Condition,

    /// Free-form attributes carried over from the inventory
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}
