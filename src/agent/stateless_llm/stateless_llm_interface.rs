use async_trait::async_trait;

use crate::agent::conversation::Message;
use crate::agent::output_types::AgentResponse;

/// Interface for a stateless language model.
/// Stateless means the model keeps no history; the caller sends the whole
/// conversation and the system prompt on every call.
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Run one completion over `messages` and return the model's reply
    async fn chat_completion(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> anyhow::Result<AgentResponse>;
}
