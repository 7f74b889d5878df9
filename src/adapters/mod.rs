//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - OpenAI and mock chat completion providers
//! - `auth` - Identity providers
//! - `http` - Axum routes for the tutor endpoint
//! - `postgres` - PostgreSQL session and turn persistence
//! - `rewards` - Reward ledger over the key-value store
//! - `storage` - In-memory and file-backed stores
//! - `tutor` - Tutor clients, prompts and wire format

pub mod ai;
pub mod auth;
pub mod http;
pub mod postgres;
pub mod rewards;
pub mod storage;
pub mod tutor;
