//! # Urbanity - Urban/Rural point classification
//!
//! Classifies a latitude/longitude point as "Urban" or "Rural" using the
//! U.S. Census Bureau TIGERweb ArcGIS REST service (2020 Census Urban Areas,
//! layer 7). All spatial work happens on the TIGERweb side; this crate builds
//! the query, decodes the answer and reshapes it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use urbanity::{Coordinate, EvalResponse, UrbanQueryClient};
//!
//! let client = UrbanQueryClient::new()?;
//! let result = client.query_urbanness(40.7128, -74.0060).await?;
//!
//! let response = EvalResponse::from_result(Coordinate::new(40.7128, -74.0060), &result);
//! println!("{} ({:?})", response.morphology(), response.name);
//! ```
//!
//! ## Features
//!
//! - `geojson`: convert an [`EvalResponse`] into a GeoJSON `Feature`

pub mod error;
pub mod eval;
pub mod model;
pub mod query;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use error::{Result, UrbanityError};
pub use eval::{Coordinate, EvalInfo, EvalResponse, Morphology};
pub use model::{Attributes, Feature, Geometry, Ring, ServiceError, UrbanQueryResult};
pub use query::{UrbanQueryClient, UrbanQueryClientBuilder, DEFAULT_ENDPOINT};
