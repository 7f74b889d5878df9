//! Learning session module.
//!
//! A session is one learning episode on a single topic. It owns the
//! evaluation result but not the dialogue turns.

mod aggregate;
mod errors;
mod evaluation;

pub use aggregate::{LearningSession, MAX_TOPIC_LENGTH};
pub use errors::SessionError;
pub use evaluation::Evaluation;
