//! TIGERweb query response model.
//!
//! The ArcGIS REST `query` operation answers with a JSON object whose layout
//! depends on the layer, the requested `outFields` and the server version.
//! Every level is therefore modelled as optional: a missing segment, or one of
//! an unexpected type, yields `None`, never a decode failure. Members this
//! crate does not use are kept in `extra` maps so the response survives a
//! serialize round trip intact.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A polygon ring: a sequence of `[x, y]` (or `[x, y, z, ...]`) positions.
pub type Ring = Vec<Vec<f64>>;

/// Response body of `TIGERweb/Urban/MapServer/7/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrbanQueryResult {
    /// Urban area polygons intersecting the queried point, in server order.
    ///
    /// An entry that is not a feature object is kept as `None` so the list
    /// length still reflects what the server sent.
    #[serde(
        default,
        deserialize_with = "lenient_seq",
        skip_serializing_if = "Option::is_none"
    )]
    pub features: Option<Vec<Option<Feature>>>,
    /// ArcGIS error object, present when the server rejected the query.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<ServiceError>,
    /// Everything else (`displayFieldName`, `fieldAliases`, `spatialReference`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single feature of the query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub attributes: Option<Attributes>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attributes requested through `outFields=BASENAME,NAME,UA,GEOID,LSADC`.
///
/// A value that is not a string resolves to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Full urban area name, e.g. "New York--Jersey City--Newark, NY--NJ".
    #[serde(
        rename = "NAME",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Name without the state suffix.
    #[serde(
        rename = "BASENAME",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub basename: Option<String>,
    /// Urban area code.
    #[serde(
        rename = "UA",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub ua: Option<String>,
    #[serde(
        rename = "GEOID",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub geoid: Option<String>,
    /// Legal/statistical area description code.
    #[serde(
        rename = "LSADC",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub lsadc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Esri polygon geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// `None` when absent or when any position is not a list of numbers.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub rings: Option<Vec<Ring>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ArcGIS REST error payload (`{"error": {"code": 400, "message": "...", "details": []}}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub details: Vec<String>,
}

/// Deserialize `T`, resolving a value of any other shape to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Deserialize a list element by element; the list itself must be an array.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

impl UrbanQueryResult {
    /// Build a result from any parsed JSON body.
    ///
    /// A body that is not an object has no features.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Whether the point intersects at least one urban area.
    ///
    /// A missing `features` member counts as empty. Entries are counted
    /// whatever their shape.
    pub fn has_features(&self) -> bool {
        self.features.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// The first feature, if any and if it is a feature object.
    pub fn first_feature(&self) -> Option<&Feature> {
        self.features
            .as_ref()
            .and_then(|f| f.first())
            .and_then(Option::as_ref)
    }

    /// `features[0].attributes.NAME`.
    pub fn first_name(&self) -> Option<&str> {
        self.first_feature()
            .and_then(|f| f.attributes.as_ref())
            .and_then(|a| a.name.as_deref())
    }

    /// `features[0].geometry.rings`.
    pub fn first_rings(&self) -> Option<&[Ring]> {
        self.first_feature()
            .and_then(|f| f.geometry.as_ref())
            .and_then(|g| g.rings.as_deref())
    }
}
