//! HTTP adapter for the tutor endpoint.
//!
//! - `POST /socratic-tutor` - Run one tutor action (wire format in
//!   [`crate::adapters::tutor::wire`])
//! - `GET /health` - Liveness check

mod handlers;
mod routes;

pub use handlers::{dispatch, TutorApiError, TutorAppState};
pub use routes::{cors_for_origins, tutor_router, tutor_router_with_cors, tutor_routes};
