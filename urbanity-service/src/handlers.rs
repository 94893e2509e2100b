//! HTTP request handlers for the classification service.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use urbanity::{Coordinate, EvalResponse, UrbanityError};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Body returned when `lat`/`lng` are missing or not numbers.
pub const MISSING_COORDINATES: &str = "missing lat/lng";

/// Query parameters for the evaluation endpoints.
///
/// Both values arrive as raw strings so that a missing or non-numeric value
/// produces the fixed 400 body instead of an extractor rejection. A repeated
/// key keeps its first value.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EvalQuery {
    /// Latitude in decimal degrees.
    #[param(value_type = f64)]
    pub lat: Option<String>,
    /// Longitude in decimal degrees.
    #[param(value_type = f64)]
    pub lng: Option<String>,
}

impl EvalQuery {
    /// Pick `lat` and `lng` out of the decoded query pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lng" => &mut query.lng,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::parse(self.lat.as_deref(), self.lng.as_deref())
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Classify a point as Urban or Rural.
///
/// # Returns
///
/// - `200 OK` with the classification
/// - `400 Bad Request` if `lat` or `lng` is missing or not a number
/// - `500 Internal Server Error` if the TIGERweb query fails
#[utoipa::path(
    get,
    path = "/eval",
    tag = "eval",
    params(EvalQuery),
    responses(
        (status = 200, description = "Classification of the point", body = EvalResponse),
        (status = 400, description = "Missing or non-numeric lat/lng", body = ErrorResponse),
        (status = 500, description = "TIGERweb query failed")
    )
)]
pub async fn get_eval(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let Some(coordinate) = coordinate_from(query) else {
        return missing_coordinates();
    };

    match evaluate(&state, coordinate).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => upstream_error(coordinate, e),
    }
}

/// Classify a point and return the urban area as a GeoJSON Feature.
///
/// The geometry is a Polygon built from the urban area rings, or `null` for
/// rural points.
#[utoipa::path(
    get,
    path = "/eval/geojson",
    tag = "eval",
    params(EvalQuery),
    responses(
        (status = 200, description = "GeoJSON Feature with the urban area polygon"),
        (status = 400, description = "Missing or non-numeric lat/lng", body = ErrorResponse),
        (status = 500, description = "TIGERweb query failed")
    )
)]
pub async fn get_eval_geojson(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let Some(coordinate) = coordinate_from(query) else {
        return missing_coordinates();
    };

    match evaluate(&state, coordinate).await {
        Ok(response) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/geo+json")],
            Json(urbanity::geojson::to_feature(&response)),
        )
            .into_response(),
        Err(e) => upstream_error(coordinate, e),
    }
}

fn coordinate_from(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Option<Coordinate> {
    match query {
        Ok(Query(pairs)) => EvalQuery::from_pairs(pairs).coordinate(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable query string");
            None
        }
    }
}

/// Query TIGERweb and reshape the result.
async fn evaluate(state: &AppState, coordinate: Coordinate) -> urbanity::Result<EvalResponse> {
    tracing::debug!(
        lat = coordinate.lat,
        lng = coordinate.lng,
        "Evaluation query"
    );

    let result = state
        .client
        .query_urbanness(coordinate.lat, coordinate.lng)
        .await?;
    let response = EvalResponse::from_result(coordinate, &result);
    log_evaluation(&response)?;

    Ok(response)
}

/// Debug-log the response exactly as it is sent.
fn log_evaluation(response: &EvalResponse) -> urbanity::Result<()> {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return Ok(());
    }

    let payload = serde_json::to_string(response)?;
    tracing::debug!(
        lat = response.info.lat,
        lng = response.info.lng,
        morphology = %response.info.morphology,
        name = ?response.name,
        rings = response.urban_area.len(),
        payload = %payload,
        "Evaluation complete"
    );
    Ok(())
}

fn missing_coordinates() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: MISSING_COORDINATES.to_string(),
        }),
    )
        .into_response()
}

/// Upstream failures are not recovered; the caller gets an opaque 500.
fn upstream_error(coordinate: Coordinate, e: UrbanityError) -> Response {
    tracing::warn!(
        lat = coordinate.lat,
        lng = coordinate.lng,
        kind = e.kind(),
        error = %e,
        "TIGERweb query failed"
    );

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
