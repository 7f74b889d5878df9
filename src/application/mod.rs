//! Application layer - Dialogue orchestration, evaluation, and session handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (create, delete) and queries (get, list, turns) are handled
//! separately; the dialogue controller owns the live state of open sessions.

pub mod dialogue;
mod evaluation_gate;
pub mod handlers;

pub use dialogue::{
    conversation_history, DialogueController, DialogueError, DialogueSnapshot, SubmitOutcome,
};
pub use evaluation_gate::EvaluationGate;
pub use handlers::{
    CreateSessionCommand, CreateSessionHandler, CreateSessionResult, DeleteSessionCommand,
    DeleteSessionHandler, GetSessionHandler, GetSessionQuery, GetSessionTurnsHandler,
    GetSessionTurnsQuery, ListSessionsHandler,
};
