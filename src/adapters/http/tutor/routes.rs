//! Axum router configuration for the tutor endpoint.

use axum::{
    http::{header::InvalidHeaderValue, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health, socratic_tutor, TutorAppState};

/// Tutor routes without middleware.
///
/// # Routes
/// - `POST /socratic-tutor` - Run one tutor action
/// - `GET /health` - Liveness check
pub fn tutor_routes() -> Router<TutorAppState> {
    Router::new()
        .route("/socratic-tutor", post(socratic_tutor))
        .route("/health", get(health))
}

/// Tutor router accepting requests from any origin.
pub fn tutor_router(state: TutorAppState) -> Router {
    tutor_router_with_cors(state, CorsLayer::permissive())
}

/// Tutor router with request tracing and the given CORS policy.
pub fn tutor_router_with_cors(state: TutorAppState, cors: CorsLayer) -> Router {
    tutor_routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy for the configured origins; any origin when the list is empty.
pub fn cors_for_origins(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
