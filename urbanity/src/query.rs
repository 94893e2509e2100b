//! TIGERweb urban area query.
//!
//! [`UrbanQueryClient`] sends one point-in-polygon query to the Census
//! TIGERweb ArcGIS REST service for every call. Nothing is cached and nothing
//! is retried: a failed call is reported to the caller as-is.
//!
//! ```ignore
//! use urbanity::UrbanQueryClientBuilder;
//!
//! let client = UrbanQueryClientBuilder::from_env()?.build()?;
//! let result = client.query_urbanness(40.7128, -74.0060).await?;
//! println!("urban: {}", result.has_features());
//! ```

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::{Result, UrbanityError};
use crate::model::UrbanQueryResult;

/// TIGERweb 2020 Census Urban Areas layer.
pub const DEFAULT_ENDPOINT: &str =
    "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb/Urban/MapServer/7/query";

/// Attributes requested for each intersecting urban area.
pub const OUT_FIELDS: &str = "BASENAME,NAME,UA,GEOID,LSADC";

/// Build the query string parameters for a point, in the order they are sent.
///
/// ArcGIS expects `x,y`, so the geometry is longitude first.
pub fn query_params(lat: f64, lng: f64) -> [(&'static str, String); 8] {
    [
        ("where", "1=1".to_string()),
        ("geometry", format!("{:?},{:?}", lng, lat)),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("inSR", "4326".to_string()),
        ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ("outFields", OUT_FIELDS.to_string()),
        ("returnGeometry", "true".to_string()),
        ("f", "pjson".to_string()),
    ]
}

/// Client for the TIGERweb urban area query.
#[derive(Debug, Clone)]
pub struct UrbanQueryClient {
    client: Client,
    endpoint: Url,
}

impl UrbanQueryClient {
    /// Create a client for the default TIGERweb endpoint, without a timeout.
    pub fn new() -> Result<Self> {
        UrbanQueryClientBuilder::new().build()
    }

    /// Create a builder for more configuration options.
    pub fn builder() -> UrbanQueryClientBuilder {
        UrbanQueryClientBuilder::new()
    }

    /// The endpoint queries are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask TIGERweb which urban areas contain `(lat, lng)`.
    ///
    /// Coordinates are forwarded unchecked; out-of-range values are left for
    /// the server to reject or answer with an empty feature list.
    ///
    /// # Errors
    ///
    /// - [`UrbanityError::Transport`] if the request cannot be completed
    /// - [`UrbanityError::HttpStatus`] on a non-2xx status
    /// - [`UrbanityError::Decode`] if the body is not valid JSON; valid JSON
    ///   of an unexpected shape decodes to a result without features
    /// - [`UrbanityError::Service`] if the body is an ArcGIS error object
    pub async fn query_urbanness(&self, lat: f64, lng: f64) -> Result<UrbanQueryResult> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&query_params(lat, lng))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UrbanityError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let mut result = UrbanQueryResult::from_value(value);

        if let Some(error) = result.error.take() {
            return Err(UrbanityError::Service {
                code: error.code,
                message: error.message,
            });
        }

        Ok(result)
    }
}

/// Builder for [`UrbanQueryClient`].
#[derive(Debug, Clone)]
pub struct UrbanQueryClientBuilder {
    endpoint: String,
    timeout_secs: Option<u64>,
}

impl Default for UrbanQueryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UrbanQueryClientBuilder {
    /// Create a builder targeting [`DEFAULT_ENDPOINT`] with no timeout.
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `URBANITY_ENDPOINT` | TIGERweb query endpoint | [`DEFAULT_ENDPOINT`] |
    /// | `URBANITY_TIMEOUT_SECS` | Outbound request timeout in seconds | None |
    ///
    /// # Errors
    ///
    /// Returns an error if `URBANITY_TIMEOUT_SECS` is set but not a number.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();

        if let Ok(endpoint) = std::env::var("URBANITY_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                builder.endpoint = endpoint.trim().to_string();
            }
        }

        if let Ok(timeout) = std::env::var("URBANITY_TIMEOUT_SECS") {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| UrbanityError::Config {
                    reason: format!("URBANITY_TIMEOUT_SECS is not a number: {:?}", timeout),
                })?;
            builder.timeout_secs = Some(secs);
        }

        Ok(builder)
    }

    /// Set the query endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the outbound request timeout. `None` waits indefinitely.
    pub fn timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build the [`UrbanQueryClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an `http` or `https` URL, or the
    /// HTTP client cannot be created (e.g., TLS initialization failure).
    pub fn build(self) -> Result<UrbanQueryClient> {
        let endpoint = Url::parse(&self.endpoint).map_err(|e| UrbanityError::Config {
            reason: format!("invalid endpoint {:?}: {}", self.endpoint, e),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(UrbanityError::Config {
                reason: format!("endpoint must use http or https: {}", endpoint),
            });
        }

        let mut client = Client::builder();
        if let Some(secs) = self.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }
        let client = client.build().map_err(|e| UrbanityError::Config {
            reason: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(UrbanQueryClient { client, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{extract::Query, http::StatusCode, routing::get, Router};

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Serve `body` with `status` on an ephemeral port, recording query strings.
    async fn stub(status: StatusCode, body: &'static str) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/query",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(params);
                    (status, body)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/query", addr), seen)
    }

    fn client_for(endpoint: &str) -> UrbanQueryClient {
        UrbanQueryClientBuilder::new()
            .endpoint(endpoint)
            .timeout_secs(Some(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_query_params_longitude_first() {
        let params = query_params(40.7128, -74.0060);
        assert_eq!(params[1], ("geometry", "-74.006,40.7128".to_string()));
        // Whole degrees keep their decimal point.
        assert_eq!(query_params(45.0, -110.0)[1].1, "-110.0,45.0");

        let names: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec![
                "where",
                "geometry",
                "geometryType",
                "inSR",
                "spatialRel",
                "outFields",
                "returnGeometry",
                "f"
            ]
        );
    }

    #[test]
    fn test_builder_defaults() {
        let client = UrbanQueryClient::new().unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_builder_rejects_bad_endpoint() {
        let result = UrbanQueryClientBuilder::new().endpoint("not a url").build();
        assert!(matches!(result, Err(UrbanityError::Config { .. })));

        let result = UrbanQueryClientBuilder::new()
            .endpoint("ftp://example.com/query")
            .build();
        assert!(matches!(result, Err(UrbanityError::Config { .. })));
    }

    #[test]
    fn test_from_env() {
        let orig_endpoint = std::env::var("URBANITY_ENDPOINT").ok();
        let orig_timeout = std::env::var("URBANITY_TIMEOUT_SECS").ok();

        std::env::set_var("URBANITY_ENDPOINT", "http://localhost:9999/query");
        std::env::set_var("URBANITY_TIMEOUT_SECS", "12");
        let builder = UrbanQueryClientBuilder::from_env().unwrap();
        assert_eq!(builder.endpoint, "http://localhost:9999/query");
        assert_eq!(builder.timeout_secs, Some(12));

        std::env::set_var("URBANITY_TIMEOUT_SECS", "soon");
        assert!(UrbanQueryClientBuilder::from_env().is_err());

        std::env::remove_var("URBANITY_ENDPOINT");
        std::env::remove_var("URBANITY_TIMEOUT_SECS");
        let builder = UrbanQueryClientBuilder::from_env().unwrap();
        assert_eq!(builder.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(builder.timeout_secs, None);

        match orig_endpoint {
            Some(v) => std::env::set_var("URBANITY_ENDPOINT", v),
            None => std::env::remove_var("URBANITY_ENDPOINT"),
        }
        match orig_timeout {
            Some(v) => std::env::set_var("URBANITY_TIMEOUT_SECS", v),
            None => std::env::remove_var("URBANITY_TIMEOUT_SECS"),
        }
    }

    #[tokio::test]
    async fn test_query_sends_expected_parameters() {
        let (endpoint, seen) = stub(StatusCode::OK, r#"{"features": []}"#).await;
        let client = client_for(&endpoint);

        let result = client.query_urbanness(45.0, -110.0).await.unwrap();
        assert!(!result.has_features());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let params = &seen[0];
        assert_eq!(params["where"], "1=1");
        assert_eq!(params["geometry"], "-110.0,45.0");
        assert_eq!(params["geometryType"], "esriGeometryPoint");
        assert_eq!(params["inSR"], "4326");
        assert_eq!(params["spatialRel"], "esriSpatialRelIntersects");
        assert_eq!(params["outFields"], "BASENAME,NAME,UA,GEOID,LSADC");
        assert_eq!(params["returnGeometry"], "true");
        assert_eq!(params["f"], "pjson");
    }

    #[tokio::test]
    async fn test_query_is_not_cached() {
        let (endpoint, seen) = stub(StatusCode::OK, r#"{"features": []}"#).await;
        let client = client_for(&endpoint);

        client.query_urbanness(45.0, -110.0).await.unwrap();
        client.query_urbanness(45.0, -110.0).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_http_status_error() {
        let (endpoint, seen) = stub(StatusCode::BAD_GATEWAY, "upstream down").await;
        let client = client_for(&endpoint);

        let err = client.query_urbanness(45.0, -110.0).await.unwrap_err();
        assert!(matches!(err, UrbanityError::HttpStatus { status: 502 }));
        // No retry.
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_decode_error() {
        let (endpoint, _) = stub(StatusCode::OK, "<html>maintenance</html>").await;
        let client = client_for(&endpoint);

        let err = client.query_urbanness(45.0, -110.0).await.unwrap_err();
        assert!(matches!(err, UrbanityError::Decode(_)));
    }

    #[tokio::test]
    async fn test_query_unexpected_shape_is_not_an_error() {
        let (endpoint, _) = stub(StatusCode::OK, r#"[{"features": 1}]"#).await;
        let client = client_for(&endpoint);
        let result = client.query_urbanness(45.0, -110.0).await.unwrap();
        assert!(!result.has_features());

        let (endpoint, _) = stub(
            StatusCode::OK,
            r#"{"features": [{"attributes": {"NAME": 123}, "geometry": {"rings": [[null]]}}]}"#,
        )
        .await;
        let client = client_for(&endpoint);
        let result = client.query_urbanness(45.0, -110.0).await.unwrap();
        assert!(result.has_features());
        assert!(result.first_name().is_none());
        assert!(result.first_rings().is_none());
    }

    #[tokio::test]
    async fn test_query_service_error() {
        let (endpoint, _) = stub(
            StatusCode::OK,
            r#"{"error": {"code": 400, "message": "Unable to complete operation.", "details": []}}"#,
        )
        .await;
        let client = client_for(&endpoint);

        let err = client.query_urbanness(45.0, -110.0).await.unwrap_err();
        match err {
            UrbanityError::Service { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Unable to complete operation.");
            }
            other => panic!("Expected Service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}/query", addr));
        let err = client.query_urbanness(45.0, -110.0).await.unwrap_err();
        assert!(matches!(err, UrbanityError::Transport(_)));
    }
}
