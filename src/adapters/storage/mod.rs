//! Storage Adapters
//!
//! In-process and file-backed implementations of the persistence ports.
//!
//! ## Available Adapters
//!
//! - **InMemorySessionRepository** - Learning sessions in memory
//! - **InMemoryMessageStore** - Dialogue turns in memory
//! - **InMemoryKeyValueStore** - Reward side-state in memory
//! - **FileKeyValueStore** - Reward side-state as one JSON file on disk
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
//!
//! // Production: survives restarts
//! let kv = FileKeyValueStore::new("./data/rewards.json");
//!
//! // Testing
//! let kv = InMemoryKeyValueStore::new();
//! ```

mod file_kv_store;
mod in_memory_kv_store;
mod in_memory_message_store;
mod in_memory_session_repository;

pub use file_kv_store::FileKeyValueStore;
pub use in_memory_kv_store::InMemoryKeyValueStore;
pub use in_memory_message_store::InMemoryMessageStore;
pub use in_memory_session_repository::InMemorySessionRepository;
