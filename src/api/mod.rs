pub mod client;
pub mod types;

pub use client::{HttpBackend, RetryPolicy};

use crate::core::error::ChatError;
use crate::store::{Message, Settings};
use async_trait::async_trait;

/// The inference backend as seen by the client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends the whole conversation and returns the assistant's reply.
    async fn send_chat(&self, messages: &[Message], settings: &Settings)
    -> Result<String, ChatError>;

    /// Lists the model ids the backend accepts.
    async fn fetch_models(&self) -> Result<Vec<String>, ChatError>;

    /// Returns the backend's self-reported status.
    async fn health(&self) -> Result<String, ChatError>;
}
