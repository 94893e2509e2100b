//! Urbanity Service - HTTP microservice for Urban/Rural classification.
//!
//! Answers "is this point inside a 2020 Census Urban Area?" by forwarding the
//! coordinate to the TIGERweb ArcGIS REST service.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `URBANITY_PORT` | HTTP server port | 8080 |
//! | `URBANITY_STATIC_DIR` | Directory served at `/` | `static` |
//! | `URBANITY_ENDPOINT` | TIGERweb query endpoint | Urban Areas layer 7 |
//! | `URBANITY_TIMEOUT_SECS` | Outbound request timeout | None |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /` - Landing page
//! - `GET /eval?lat=X&lng=Y` - Classify a point
//! - `GET /eval/geojson?lat=X&lng=Y` - Classify a point, GeoJSON output
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use urbanity::UrbanQueryClientBuilder;
use urbanity_service::{router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urbanity_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();
    let client = UrbanQueryClientBuilder::from_env()?.build()?;

    tracing::info!(
        endpoint = %client.endpoint(),
        static_dir = %config.static_dir.display(),
        port = config.port,
        "Starting urbanity service"
    );

    if !config.static_dir.is_dir() {
        tracing::warn!(
            static_dir = %config.static_dir.display(),
            "Static directory not found, landing page will return 404"
        );
    }

    let state = Arc::new(AppState { client });
    let app = router(state, &config.static_dir);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
