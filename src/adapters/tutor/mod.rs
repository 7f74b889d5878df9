//! Tutor client adapters.
//!
//! - [`LlmTutorClient`] prompts an [`crate::ports::AIProvider`] directly
//! - [`HttpTutorClient`] calls a remote `/socratic-tutor` endpoint
//!
//! Both share the wire format in [`wire`] and the fallback payloads in
//! [`fallbacks`].

pub mod fallbacks;
mod http_client;
mod llm_tutor_client;
pub mod prompts;
pub mod wire;

pub use http_client::HttpTutorClient;
pub use llm_tutor_client::{LlmTutorClient, DEFAULT_TEMPERATURE};
pub use wire::{TutorRequest, TutorResponse};
