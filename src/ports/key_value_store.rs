//! Key-value store port.
//!
//! Small JSON documents keyed by string, used for reward side-state. Last
//! write wins per key; there are no cross-key guarantees.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum KeyValueError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for the reward side-state store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Missing keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>, KeyValueError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<(), KeyValueError>;
}
