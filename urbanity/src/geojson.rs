//! GeoJSON output for evaluations.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use urbanity::{geojson::to_feature, Coordinate, EvalResponse};
//!
//! let response = EvalResponse::from_result(Coordinate::new(40.7128, -74.006), &result);
//! let feature = to_feature(&response);
//! println!("{}", feature);
//! ```

use geojson::{Feature, Geometry, JsonObject, JsonValue, Value as GeoJsonValue};

use crate::eval::EvalResponse;

/// Convert an evaluation into a GeoJSON `Feature`.
///
/// The urban area rings become a single `Polygon`, keeping the ArcGIS ring
/// order and orientation (outer rings clockwise, holes counter-clockwise).
/// Rural points, and urban points without geometry, get a `null` geometry.
///
/// Properties: `lat`, `lng`, `morphology`, `name`.
pub fn to_feature(response: &EvalResponse) -> Feature {
    let geometry = if response.urban_area.is_empty() {
        None
    } else {
        Some(Geometry::new(GeoJsonValue::Polygon(
            response.urban_area.clone(),
        )))
    };

    let mut properties = JsonObject::new();
    properties.insert("lat".to_string(), JsonValue::from(response.info.lat));
    properties.insert("lng".to_string(), JsonValue::from(response.info.lng));
    properties.insert(
        "morphology".to_string(),
        JsonValue::from(response.info.morphology.as_str()),
    );
    properties.insert(
        "name".to_string(),
        response
            .name
            .as_deref()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
    );

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
