//! Identity adapters.
//!
//! - `static_identity` - a fixed or switchable learner, no external service

mod static_identity;

pub use static_identity::StaticIdentityProvider;
