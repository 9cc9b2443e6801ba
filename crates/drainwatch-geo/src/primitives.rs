//! Stateless geometry primitives.
//!
//! All inputs are in storage order (`LngLat`). `haversine_km` is the one
//! exception: it takes latitude first, like the query parameters it serves.

use drainwatch_core::models::LngLat;
use geo::algorithm::contains::Contains;
use geo::{Closest, ClosestPoint, Distance, Haversine, Line};

use crate::models::{to_coord, to_line_string, to_point, to_polygon};

/// Earth radius used by the proximity formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Test whether a point lies strictly inside a single closed ring.
///
/// The ring does not need to repeat its first vertex. Rings with fewer than
/// three vertices never contain anything; self-intersecting rings give
/// unspecified results.
pub fn point_in_polygon(point: LngLat, ring: &[LngLat]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let polygon = geo::Polygon::new(to_line_string(ring), vec![]);
    polygon.contains(&to_point(point))
}

/// Test whether a point lies inside a boundary given as outer ring plus holes
pub fn point_in_boundary(point: LngLat, rings: &[Vec<LngLat>]) -> bool {
    match rings.first() {
        Some(outer) if outer.len() >= 3 => to_polygon(rings).contains(&to_point(point)),
        _ => false,
    }
}

/// Minimum distance in meters from a point to an open polyline.
///
/// Each segment's nearest point is found in coordinate space and the gap is
/// measured along the great circle. A single-vertex line degenerates to a
/// point distance; an empty line is infinitely far away.
pub fn point_to_line_distance_meters(point: LngLat, polyline: &[LngLat]) -> f64 {
    let target = to_point(point);

    match polyline {
        [] => f64::INFINITY,
        [only] => Haversine.distance(target, to_point(*only)),
        _ => polyline
            .windows(2)
            .map(|pair| {
                let line = Line::new(to_coord(pair[0]), to_coord(pair[1]));
                let nearest = match line.closest_point(&target) {
                    Closest::Intersection(p) | Closest::SinglePoint(p) => p,
                    Closest::Indeterminate => to_point(pair[0]),
                };
                Haversine.distance(target, nearest)
            })
            .fold(f64::INFINITY, f64::min),
    }
}

/// Great-circle distance in kilometers between two latitude/longitude pairs
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(min: f64, max: f64) -> Vec<LngLat> {
        vec![
            LngLat::new(min, min),
            LngLat::new(max, min),
            LngLat::new(max, max),
            LngLat::new(min, max),
            LngLat::new(min, min),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let ring = square(0.0, 10.0);
        assert!(point_in_polygon(LngLat::new(5.0, 5.0), &ring));
        assert!(!point_in_polygon(LngLat::new(15.0, 15.0), &ring));
    }

    #[test]
    fn test_open_ring_is_closed_implicitly() {
        let ring = vec![LngLat::new(0.0, 0.0), LngLat::new(4.0, 0.0), LngLat::new(0.0, 4.0)];
        assert!(point_in_polygon(LngLat::new(1.0, 1.0), &ring));
    }

    #[test]
    fn test_degenerate_ring_contains_nothing() {
        let ring = vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)];
        assert!(!point_in_polygon(LngLat::new(0.5, 0.5), &ring));
    }

    #[test]
    fn test_point_in_hole_is_outside_boundary() {
        let rings = vec![square(0.0, 10.0), square(4.0, 6.0)];
        assert!(point_in_boundary(LngLat::new(2.0, 2.0), &rings));
        assert!(!point_in_boundary(LngLat::new(5.0, 5.0), &rings));
        assert!(!point_in_boundary(LngLat::new(5.0, 5.0), &[]));
    }

    #[test]
    fn test_distance_to_vertex_is_zero() {
        let line = vec![LngLat::new(109.33, -0.03), LngLat::new(109.34, -0.02)];
        assert!(point_to_line_distance_meters(LngLat::new(109.34, -0.02), &line) < 1e-6);
        assert!(point_to_line_distance_meters(LngLat::new(109.33, -0.03), &line) < 1e-6);
    }

    #[test]
    fn test_distance_is_perpendicular_not_to_vertices() {
        // East-west line along the equator, point ~111m north of its middle
        let line = vec![LngLat::new(109.0, 0.0), LngLat::new(109.02, 0.0)];
        let dist = point_to_line_distance_meters(LngLat::new(109.01, 0.001), &line);
        assert!(dist > 100.0 && dist < 120.0, "expected ~111m, got {}", dist);
    }

    #[test]
    fn test_polyline_is_open() {
        // U-shaped line; the gap between the last and first vertex is not a segment
        let line = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(0.0, 0.01),
            LngLat::new(0.01, 0.01),
            LngLat::new(0.01, 0.0),
        ];
        let dist = point_to_line_distance_meters(LngLat::new(0.005, 0.0), &line);
        assert!(dist > 500.0, "closing edge must not count, got {}", dist);
    }

    #[test]
    fn test_empty_and_single_vertex_lines() {
        assert!(point_to_line_distance_meters(LngLat::new(0.0, 0.0), &[]).is_infinite());
        let single = [LngLat::new(0.0, 0.0)];
        assert!(point_to_line_distance_meters(LngLat::new(0.0, 0.0), &single) < 1e-9);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London is about 344km
        let km = haversine_km(48.8566, 2.3522, 51.5074, -0.1276);
        assert!(km > 339.0 && km < 349.0, "got {}", km);
    }

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(haversine_km(-0.02, 109.34, -0.02, 109.34), 0.0);
    }

    proptest! {
        #[test]
        fn prop_convex_polygon_contains_centroid(
            cx in -170.0f64..170.0,
            cy in -80.0f64..80.0,
            r in 0.001f64..5.0,
            sides in 3usize..12,
        ) {
            let ring: Vec<LngLat> = (0..sides)
                .map(|i| {
                    let angle = std::f64::consts::TAU * i as f64 / sides as f64;
                    LngLat::new(cx + r * angle.cos(), cy + r * angle.sin())
                })
                .collect();
            prop_assert!(point_in_polygon(LngLat::new(cx, cy), &ring));
            prop_assert!(!point_in_polygon(LngLat::new(cx + 3.0 * r, cy + 3.0 * r), &ring));
        }

        #[test]
        fn prop_vertex_distance_is_zero(
            coords in proptest::collection::vec((-179.0f64..179.0, -85.0f64..85.0), 2..8),
            pick in 0usize..8,
        ) {
            let line: Vec<LngLat> = coords.iter().map(|&(x, y)| LngLat::new(x, y)).collect();
            let vertex = line[pick % line.len()];
            prop_assert!(point_to_line_distance_meters(vertex, &line) < 1e-6);
        }
    }
}
