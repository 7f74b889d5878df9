//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `session` - Learning session aggregate and its evaluation
//! - `conversation` - Turns, dialogue lifecycle, response analysis
//! - `rewards` - Badges, achievements, points and the evaluation policy

pub mod conversation;
pub mod foundation;
pub mod rewards;
pub mod session;
