//! Matching a report point against sub-district boundaries and drainage lines.

use drainwatch_core::models::{DrainageSegment, Geometry, LngLat, SubDistrict};

use crate::primitives::{point_in_boundary, point_to_line_distance_meters};

/// Name reported when a point falls inside no known boundary
pub const UNKNOWN_SUB_DISTRICT: &str = "unknown";

/// Outcome of sub-district resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubDistrictMatch<'a> {
    Found(&'a SubDistrict),
    Unknown,
}

impl<'a> SubDistrictMatch<'a> {
    /// Matched sub-district name, or `"unknown"`
    pub fn name(&self) -> &'a str {
        match *self {
            SubDistrictMatch::Found(sub_district) => &sub_district.name,
            SubDistrictMatch::Unknown => UNKNOWN_SUB_DISTRICT,
        }
    }

    pub fn sub_district(&self) -> Option<&'a SubDistrict> {
        match *self {
            SubDistrictMatch::Found(sub_district) => Some(sub_district),
            SubDistrictMatch::Unknown => None,
        }
    }
}

/// Resolve the sub-district whose boundary contains the point.
///
/// A point inside a hole of a boundary is not inside it. Boundaries are
/// expected not to overlap. If they do, the first match in input order wins.
pub fn resolve_sub_district(point: LngLat, boundaries: &[SubDistrict]) -> SubDistrictMatch<'_> {
    boundaries
        .iter()
        .find(|sub_district| point_in_boundary(point, &sub_district.boundary))
        .map(SubDistrictMatch::Found)
        .unwrap_or(SubDistrictMatch::Unknown)
}

/// A drainage segment together with its distance from the query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMatch<'a> {
    pub segment: &'a DrainageSegment,
    pub distance_meters: f64,
}

/// Line segments within `threshold_meters` of the point, in input order.
///
/// Only LineString geometries take part; basins and other shapes are skipped.
pub fn find_nearby_segments(
    point: LngLat,
    segments: &[DrainageSegment],
    threshold_meters: f64,
) -> Vec<&DrainageSegment> {
    matches_within(point, segments, threshold_meters).map(|m| m.segment).collect()
}

/// Same selection as [`find_nearby_segments`], closest first
pub fn rank_nearby_segments(
    point: LngLat,
    segments: &[DrainageSegment],
    threshold_meters: f64,
) -> Vec<SegmentMatch<'_>> {
    let mut matches: Vec<SegmentMatch<'_>> =
        matches_within(point, segments, threshold_meters).collect();
    matches.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    matches
}

fn matches_within(
    point: LngLat,
    segments: &[DrainageSegment],
    threshold_meters: f64,
) -> impl Iterator<Item = SegmentMatch<'_>> {
    segments.iter().filter_map(move |segment| match &segment.geometry {
        Geometry::LineString { coordinates } => {
            let distance_meters = point_to_line_distance_meters(point, coordinates);
            (distance_meters <= threshold_meters).then_some(SegmentMatch { segment, distance_meters })
        }
        _ => None,
    })
}
