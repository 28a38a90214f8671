use async_trait::async_trait;

use crate::agent::output_types::AgentResponse;

/// Base interface for all agent implementations
#[async_trait]
pub trait AgentInterface: Send + Sync {
    /// Name the agent was configured with
    fn name(&self) -> &str;

    /// Send one user prompt to the agent and wait for its reply.
    ///
    /// Any failure inside the agent (model, network, memory setup) is
    /// returned as an error; nothing is retried.
    async fn invoke(&mut self, prompt: &str) -> anyhow::Result<AgentResponse>;
}
