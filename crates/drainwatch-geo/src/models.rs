//! Conversions from `drainwatch-core` coordinates into `geo` crate types.

use drainwatch_core::models::LngLat;

pub(crate) fn to_coord(point: LngLat) -> geo::Coord {
    geo::Coord { x: point.lng, y: point.lat }
}

pub(crate) fn to_point(point: LngLat) -> geo::Point {
    geo::Point::new(point.lng, point.lat)
}

pub(crate) fn to_line_string(coords: &[LngLat]) -> geo::LineString {
    geo::LineString::new(coords.iter().copied().map(to_coord).collect())
}

pub(crate) fn to_polygon(rings: &[Vec<LngLat>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}
