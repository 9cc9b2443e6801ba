//! GeoJSON rendering of drainage segments

use drainwatch_core::models::{DrainageSegment, Geometry, LngLat};
use geojson::{feature::Id, Feature, FeatureCollection, Value};
use serde_json::{Map, Value as JsonValue};

fn position(point: &LngLat) -> Vec<f64> {
    vec![point.lng, point.lat]
}

fn ring(points: &[LngLat]) -> Vec<Vec<f64>> {
    points.iter().map(position).collect()
}

/// GeoJSON geometry; circles become their center point with a `radius` property
fn to_geojson_geometry(geometry: &Geometry) -> geojson::Geometry {
    let value = match geometry {
        Geometry::Point { coordinates } => Value::Point(position(coordinates)),
        Geometry::LineString { coordinates } => Value::LineString(ring(coordinates)),
        Geometry::Polygon { coordinates } => {
            Value::Polygon(coordinates.iter().map(|r| ring(r)).collect())
        }
        Geometry::Circle { center, .. } => Value::Point(position(center)),
    };
    geojson::Geometry::new(value)
}

fn segment_to_feature(segment: &DrainageSegment) -> Feature {
    let mut properties: Map<String, JsonValue> = segment.properties.clone();
    properties.insert("name".to_string(), JsonValue::from(segment.name.clone()));
    properties.insert("condition".to_string(), JsonValue::from(segment.condition.as_str()));
    properties.insert(
        "shape".to_string(),
        JsonValue::from(segment.geometry.geometry_type().as_str()),
    );
    if let Some(class) = segment.function_class {
        properties.insert("function_class".to_string(), JsonValue::from(class.as_str()));
    }
    if let Some(length) = segment.length_meters {
        properties.insert("length_meters".to_string(), JsonValue::from(length));
    }
    if let Some(sub_district) = segment.sub_district_id {
        properties.insert("sub_district_id".to_string(), JsonValue::from(sub_district.0));
    }
    if let Geometry::Circle { radius, .. } = segment.geometry {
        properties.insert("radius".to_string(), JsonValue::from(radius));
    }

    Feature {
        geometry: Some(to_geojson_geometry(&segment.geometry)),
        properties: Some(properties),
        id: Some(Id::Number(segment.id.0.into())),
        bbox: None,
        foreign_members: None,
    }
}

/// Segments as a FeatureCollection, coordinates in storage order
pub fn segments_to_feature_collection(segments: &[DrainageSegment]) -> FeatureCollection {
    FeatureCollection {
        features: segments.iter().map(segment_to_feature).collect(),
        bbox: None,
        foreign_members: None,
    }
}
