use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{Geometry, LngLat};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }
}

/// Validate the shape of a geometry before it is persisted
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    let mut result = ValidationResult::valid();

    match geometry {
        Geometry::Point { coordinates } => check_coords(&mut result, "point", &[*coordinates]),
        Geometry::LineString { coordinates } => {
            check_coords(&mut result, "line", coordinates);
            if coordinates.len() < 2 {
                result.add_error(
                    "line".to_string(),
                    format!("needs at least 2 vertices, got {}", coordinates.len()),
                );
            }
        }
        Geometry::Polygon { coordinates } => {
            if coordinates.is_empty() {
                result.add_error("polygon".to_string(), "has no rings".to_string());
            }
            for (idx, ring) in coordinates.iter().enumerate() {
                let location = format!("polygon ring {}", idx);
                check_coords(&mut result, &location, ring);
                let distinct = distinct_vertices(ring);
                if distinct < 3 {
                    result.add_error(
                        location,
                        format!("needs at least 3 distinct vertices, got {}", distinct),
                    );
                }
            }
        }
        Geometry::Circle { center, radius } => {
            check_coords(&mut result, "circle center", &[*center]);
            if !(radius.is_finite() && *radius > 0.0) {
                result.add_error(
                    "circle radius".to_string(),
                    format!("must be a positive number of meters, got {}", radius),
                );
            }
        }
    }

    result
}

/// Validate a geometry and turn the first problem into a `Validation` error
pub fn ensure_valid_geometry(field: &str, geometry: &Geometry) -> Result<()> {
    let result = validate_geometry(geometry);
    match result.errors.first() {
        None => Ok(()),
        Some(error) => Err(DrainError::validation(
            field,
            format!("{}: {}", error.location, error.reason),
        )),
    }
}

fn check_coords(result: &mut ValidationResult, location: &str, coords: &[LngLat]) {
    if let Some((idx, bad)) = coords.iter().enumerate().find(|(_, c)| !c.is_valid()) {
        result.add_error(
            location.to_string(),
            format!("coordinate {} ({}, {}) is outside WGS 84 bounds", idx, bad.lng, bad.lat),
        );
    }
}

fn distinct_vertices(ring: &[LngLat]) -> usize {
    let mut seen: Vec<LngLat> = Vec::with_capacity(ring.len());
    for vertex in ring {
        if !seen.contains(vertex) {
            seen.push(*vertex);
        }
    }
    seen.len()
}
