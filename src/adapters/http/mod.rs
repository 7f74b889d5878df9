//! HTTP adapters - REST API implementations.

pub mod tutor;

pub use tutor::{cors_for_origins, tutor_router, tutor_router_with_cors, TutorAppState};
