//! Dialogue orchestration: start, submit, continuation and evaluation.

mod controller;
mod errors;

pub use controller::{conversation_history, DialogueController, DialogueSnapshot, SubmitOutcome};
pub use errors::DialogueError;
