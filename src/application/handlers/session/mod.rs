//! Session command and query handlers.

mod create_session;
mod delete_session;
mod get_session;
mod get_session_turns;
mod list_sessions;

pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use get_session_turns::{GetSessionTurnsHandler, GetSessionTurnsQuery};
pub use list_sessions::ListSessionsHandler;
