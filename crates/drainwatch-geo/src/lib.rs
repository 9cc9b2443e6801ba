//! Drainwatch Geo - Geometry primitives, validation, and spatial matching
//!
//! This crate handles the geospatial side of the drainage workflow: containment
//! and distance primitives, sub-district resolution, drainage matching, and
//! proximity filtering. Every function here is pure.

pub mod matcher;
pub mod models;
pub mod primitives;
pub mod proximity;
pub mod validation;

pub use matcher::{
    find_nearby_segments, rank_nearby_segments, resolve_sub_district, SegmentMatch,
    SubDistrictMatch, UNKNOWN_SUB_DISTRICT,
};
pub use primitives::{
    haversine_km, point_in_boundary, point_in_polygon, point_to_line_distance_meters,
    EARTH_RADIUS_KM,
};
pub use proximity::{flood_zones_at, nearby};
pub use validation::{ensure_valid_geometry, validate_geometry, ValidationError, ValidationResult};
