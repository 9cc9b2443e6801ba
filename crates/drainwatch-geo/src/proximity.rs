//! Radius filtering for the public nearby search and flood-zone lookups.

use drainwatch_core::models::{DrainageSegment, FloodZone, LngLat};

use crate::primitives::haversine_km;

/// Segments whose representative location lies within `radius_km` of the user.
///
/// The representative location is the segment's first stored coordinate,
/// not the closest point of its geometry. A radius of zero or less disables
/// the filter and returns every segment. Otherwise segments without
/// coordinates are skipped.
pub fn nearby(
    user_lat: f64,
    user_lng: f64,
    radius_km: f64,
    segments: &[DrainageSegment],
) -> Vec<&DrainageSegment> {
    if radius_km <= 0.0 {
        return segments.iter().collect();
    }

    segments
        .iter()
        .filter(|segment| match segment.geometry.first_coordinate() {
            Some(first) => haversine_km(user_lat, user_lng, first.lat, first.lng) <= radius_km,
            None => false,
        })
        .collect()
}

/// Flood zones whose circle covers the point
pub fn flood_zones_at(point: LngLat, zones: &[FloodZone]) -> Vec<&FloodZone> {
    zones
        .iter()
        .filter(|zone| {
            let km = haversine_km(point.lat, point.lng, zone.center.lat, zone.center.lng);
            km * 1000.0 <= zone.radius_meters
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drainwatch_core::models::{Condition, FloodZoneId, Geometry, SegmentId};

    fn segment(id: i64, coords: Vec<[f64; 2]>) -> DrainageSegment {
        DrainageSegment {
            id: SegmentId(id),
            name: format!("Parit {}", id),
            function_class: None,
            length_meters: None,
            geometry: Geometry::line_string(coords),
            sub_district_id: None,
            condition: Condition::Good,
            properties: Default::default(),
        }
    }

    #[test]
    fn test_nearby_uses_first_coordinate_only() {
        let segments = vec![
            // starts ~111m away
            segment(1, vec![[109.341, -0.02], [109.5, -0.02]]),
            // starts ~2.2km away but passes right by the user
            segment(2, vec![[109.36, -0.02], [109.34, -0.02]]),
            // ~1.1km away
            segment(3, vec![[109.35, -0.02], [109.351, -0.02]]),
        ];

        let ids: Vec<i64> =
            nearby(-0.02, 109.34, 0.5, &segments).iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1]);

        let ids: Vec<i64> =
            nearby(-0.02, 109.34, 1.5, &segments).iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_non_positive_radius_returns_all() {
        let segments = vec![segment(1, vec![[100.0, 5.0]]), segment(2, vec![])];
        assert_eq!(nearby(-0.02, 109.34, 0.0, &segments).len(), 2);
        assert_eq!(nearby(-0.02, 109.34, -1.0, &segments).len(), 2);
    }

    #[test]
    fn test_empty_geometry_skipped_when_filtering() {
        let segments = vec![segment(1, vec![])];
        assert!(nearby(-0.02, 109.34, 1000.0, &segments).is_empty());
    }

    #[test]
    fn test_flood_zone_coverage() {
        let zones = vec![
            FloodZone {
                id: FloodZoneId(1),
                name: "Sungai Jawi".into(),
                center: LngLat::new(109.34, -0.02),
                radius_meters: 150.0,
                sub_district_id: None,
            },
            FloodZone {
                id: FloodZoneId(2),
                name: "Parit Tokaya".into(),
                center: LngLat::new(109.35, -0.02),
                radius_meters: 150.0,
                sub_district_id: None,
            },
        ];

        // ~111m east of zone 1's center
        let covered = flood_zones_at(LngLat::new(109.341, -0.02), &zones);
        assert_eq!(covered.len(), 1);
        assert_eq!(covered[0].id, FloodZoneId(1));
    }
}
