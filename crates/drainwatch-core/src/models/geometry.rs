//! Canonical coordinate and geometry types used across all drainwatch crates.
//!
//! Storage order is always longitude first. Map clients usually speak latitude
//! first, so the two orders get distinct types and only meet through explicit
//! conversions.

use serde::{Deserialize, Serialize};

/// A position in storage order, serialized as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both components are finite and inside WGS 84 bounds
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        Self { lng: pair[0], lat: pair[1] }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(point: LngLat) -> Self {
        [point.lng, point.lat]
    }
}

/// A position in presentation order, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(pair: [f64; 2]) -> Self {
        Self { lat: pair[0], lng: pair[1] }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(point: LatLng) -> Self {
        [point.lat, point.lng]
    }
}

impl From<LatLng> for LngLat {
    fn from(point: LatLng) -> Self {
        Self { lng: point.lng, lat: point.lat }
    }
}

impl From<LngLat> for LatLng {
    fn from(point: LngLat) -> Self {
        Self { lat: point.lat, lng: point.lng }
    }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    LineString,
    Polygon,
    Circle,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::Circle => "Circle",
        }
    }
}

impl std::str::FromStr for GeometryType {
    type Err = crate::error::DrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Point" => Ok(GeometryType::Point),
            "LineString" => Ok(GeometryType::LineString),
            "Polygon" => Ok(GeometryType::Polygon),
            "Circle" => Ok(GeometryType::Circle),
            other => Err(crate::error::DrainError::validation(
                "type",
                format!("unsupported geometry type '{}'", other),
            )),
        }
    }
}

/// Tagged geometry with storage-order coordinates.
///
/// Polygon coordinates are rings; the first ring is the outer boundary.
/// Circle radius is in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: LngLat },
    LineString { coordinates: Vec<LngLat> },
    Polygon { coordinates: Vec<Vec<LngLat>> },
    Circle { center: LngLat, radius: f64 },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point { coordinates: LngLat::new(lng, lat) }
    }

    /// Create a LineString geometry from `[lng, lat]` pairs
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords.into_iter().map(LngLat::from).collect() }
    }

    /// Create a single-ring Polygon geometry from `[lng, lat]` pairs
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Geometry::Polygon { coordinates: vec![ring.into_iter().map(LngLat::from).collect()] }
    }

    /// Create a Circle geometry
    pub fn circle(center: LngLat, radius_meters: f64) -> Self {
        Geometry::Circle { center, radius: radius_meters }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::Circle { .. } => GeometryType::Circle,
        }
    }

    /// The first stored coordinate pair, if any.
    ///
    /// For polygons this is the first vertex of the outer ring.
    pub fn first_coordinate(&self) -> Option<LngLat> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            Geometry::LineString { coordinates } => coordinates.first().copied(),
            Geometry::Polygon { coordinates } => {
                coordinates.first().and_then(|ring| ring.first()).copied()
            }
            Geometry::Circle { center, .. } => Some(*center),
        }
    }
}
