use crate::error::Result;
use crate::types::ChatMessage;
use async_trait::async_trait;

/// Trait for chat completion providers.
///
/// Implementations forward the message sequence as-is (adding nothing of
/// their own) together with a fixed model identifier and sampling
/// parameters, and return the generated text. One call is one attempt:
/// retry policy, if any, belongs to the caller.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run a single non-streaming completion over the given messages.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}
