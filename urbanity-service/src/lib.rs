//! Urbanity Service Library
//!
//! HTTP handlers, router and configuration for the Urban/Rural classification
//! service. This library is used by both the urbanity-service binary and
//! integration tests.

pub mod handlers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use urbanity::UrbanQueryClient;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default directory holding the landing page.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Application state shared across handlers.
pub struct AppState {
    /// TIGERweb client for urban area queries.
    pub client: UrbanQueryClient,
}

/// Process-level settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// HTTP server port.
    pub port: u16,
    /// Directory served at `/`.
    pub static_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServiceConfig {
    /// Read `URBANITY_PORT` and `URBANITY_STATIC_DIR`, falling back to defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("URBANITY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let static_dir = std::env::var("URBANITY_STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Self { port, static_dir }
    }
}

/// OpenAPI documentation for the urbanity service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Urbanity Service",
        version = "0.1.0",
        description = "Classifies coordinates as Urban or Rural using the Census TIGERweb Urban Areas layer.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_eval,
        handlers::get_eval_geojson,
        handlers::health_check,
    ),
    components(
        schemas(
            urbanity::EvalResponse,
            urbanity::EvalInfo,
            urbanity::Morphology,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "eval", description = "Urban/Rural classification endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router.
///
/// Unmatched paths fall through to the static directory, so `/` serves
/// `index.html` from `static_dir`.
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/eval", get(handlers::get_eval))
        .route("/eval/geojson", get(handlers::get_eval_geojson))
        .route("/health", get(handlers::health_check))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{ErrorResponse, EvalQuery, HealthResponse, MISSING_COORDINATES};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_from_env() {
        let orig_port = std::env::var("URBANITY_PORT").ok();
        let orig_dir = std::env::var("URBANITY_STATIC_DIR").ok();

        std::env::set_var("URBANITY_PORT", "5000");
        std::env::set_var("URBANITY_STATIC_DIR", "/srv/urbanity");
        let config = ServiceConfig::from_env();
        assert_eq!(config.port, 5000);
        assert_eq!(config.static_dir, PathBuf::from("/srv/urbanity"));

        // Unparseable port falls back to the default
        std::env::set_var("URBANITY_PORT", "eighty");
        std::env::remove_var("URBANITY_STATIC_DIR");
        assert_eq!(ServiceConfig::from_env(), ServiceConfig::default());

        match orig_port {
            Some(v) => std::env::set_var("URBANITY_PORT", v),
            None => std::env::remove_var("URBANITY_PORT"),
        }
        match orig_dir {
            Some(v) => std::env::set_var("URBANITY_STATIC_DIR", v),
            None => std::env::remove_var("URBANITY_STATIC_DIR"),
        }
    }

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/eval"));
        assert!(doc.paths.paths.contains_key("/eval/geojson"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
