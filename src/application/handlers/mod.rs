//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod session;

pub use session::{
    CreateSessionCommand, CreateSessionHandler, CreateSessionResult, DeleteSessionCommand,
    DeleteSessionHandler, GetSessionHandler, GetSessionQuery, GetSessionTurnsHandler,
    GetSessionTurnsQuery, ListSessionsHandler,
};
