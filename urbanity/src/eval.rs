//! Urban/Rural evaluation of a point.
//!
//! Reshapes a raw [`UrbanQueryResult`] into the compact [`EvalResponse`]
//! served by `/eval`.

use serde::{Deserialize, Serialize};

use crate::model::{Ring, UrbanQueryResult};

/// A queried point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coerce raw query-string values into a coordinate.
    ///
    /// Returns `None` if either value is missing or does not parse as `f64`.
    /// No range check is made; `NaN` and `inf` are accepted.
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Option<Self> {
        let lat = lat?.trim().parse::<f64>().ok()?;
        let lng = lng?.trim().parse::<f64>().ok()?;
        Some(Self { lat, lng })
    }
}

/// Settlement classification of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Morphology {
    Urban,
    Rural,
}

impl Morphology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Morphology::Urban => "Urban",
            Morphology::Rural => "Rural",
        }
    }
}

impl std::fmt::Display for Morphology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `info` block of an [`EvalResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EvalInfo {
    pub lat: f64,
    pub lng: f64,
    pub morphology: Morphology,
}

/// Compact classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EvalResponse {
    pub info: EvalInfo,
    /// Name of the first intersecting urban area, `null` when unknown.
    pub name: Option<String>,
    /// Rings of the first intersecting urban area, empty when unknown.
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Vec<Vec<f64>>>))]
    pub urban_area: Vec<Ring>,
}

impl EvalResponse {
    /// Build the response for `coordinate` from a TIGERweb query result.
    ///
    /// The point is `Urban` when at least one feature intersects it. `name`
    /// and `urban_area` are taken from the first feature and fall back to
    /// `None` / empty whenever part of the path is absent.
    pub fn from_result(coordinate: Coordinate, result: &UrbanQueryResult) -> Self {
        let morphology = if result.has_features() {
            Morphology::Urban
        } else {
            Morphology::Rural
        };

        Self {
            info: EvalInfo {
                lat: coordinate.lat,
                lng: coordinate.lng,
                morphology,
            },
            name: result.first_name().map(str::to_string),
            urban_area: result.first_rings().map(<[Ring]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn morphology(&self) -> Morphology {
        self.info.morphology
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: serde_json::Value) -> UrbanQueryResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_coordinate_parse() {
        assert_eq!(
            Coordinate::parse(Some("40.7128"), Some("-74.0060")),
            Some(Coordinate::new(40.7128, -74.006))
        );
        assert_eq!(Coordinate::parse(Some("abc"), Some("5")), None);
        assert_eq!(Coordinate::parse(Some("1"), None), None);
        assert_eq!(Coordinate::parse(None, Some("1")), None);
        assert_eq!(Coordinate::parse(Some(""), Some("1")), None);
    }

    #[test]
    fn test_coordinate_parse_no_range_check() {
        let c = Coordinate::parse(Some("123.0"), Some("-500")).unwrap();
        assert_eq!(c.lat, 123.0);
        assert_eq!(c.lng, -500.0);

        let c = Coordinate::parse(Some("NaN"), Some("inf")).unwrap();
        assert!(c.lat.is_nan());
        assert!(c.lng.is_infinite());
    }

    #[test]
    fn test_urban_new_york() {
        let r = result(json!({
            "features": [{
                "attributes": {"NAME": "New York"},
                "geometry": {"rings": [[[-74.0, 40.7], [-74.1, 40.8], [-74.0, 40.7]]]}
            }]
        }));
        let response = EvalResponse::from_result(Coordinate::new(40.7128, -74.0060), &r);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "info": {"lat": 40.7128, "lng": -74.006, "morphology": "Urban"},
                "name": "New York",
                "urbanArea": [[[-74.0, 40.7], [-74.1, 40.8], [-74.0, 40.7]]]
            })
        );
    }

    #[test]
    fn test_rural_montana() {
        let r = result(json!({"features": []}));
        let response = EvalResponse::from_result(Coordinate::new(45.0, -110.0), &r);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "info": {"lat": 45.0, "lng": -110.0, "morphology": "Rural"},
                "name": null,
                "urbanArea": []
            })
        );
    }

    #[test]
    fn test_missing_name_and_geometry() {
        let r = result(json!({"features": [{"attributes": {"BASENAME": "Helena"}}]}));
        let response = EvalResponse::from_result(Coordinate::new(46.6, -112.0), &r);

        assert_eq!(response.morphology(), Morphology::Urban);
        assert_eq!(response.name, None);
        assert!(response.urban_area.is_empty());
    }

    #[test]
    fn test_only_first_feature_used() {
        let r = result(json!({
            "features": [
                {"attributes": {"NAME": "First"}, "geometry": {"rings": [[[1.0, 1.0]]]}},
                {"attributes": {"NAME": "Second"}, "geometry": {"rings": [[[2.0, 2.0]]]}}
            ]
        }));
        let response = EvalResponse::from_result(Coordinate::new(1.0, 1.0), &r);

        assert_eq!(response.name.as_deref(), Some("First"));
        assert_eq!(response.urban_area, vec![vec![vec![1.0, 1.0]]]);
    }

    #[test]
    fn test_missing_features_is_rural() {
        let r = result(json!({"spatialReference": {"wkid": 4326}}));
        let response = EvalResponse::from_result(Coordinate::new(0.0, 0.0), &r);

        assert_eq!(response.morphology(), Morphology::Rural);
        assert_eq!(response.name, None);
        assert!(response.urban_area.is_empty());
    }

    #[test]
    fn test_morphology_display() {
        assert_eq!(Morphology::Urban.to_string(), "Urban");
        assert_eq!(Morphology::Rural.to_string(), "Rural");
    }
}
