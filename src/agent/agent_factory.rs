use std::sync::Arc;
use tracing::info;

use crate::agent::agents::{AgentInterface, CalculatorAgent};
use crate::agent::conversation::SlidingWindowConversationManager;
use crate::agent::prompts::CALCULATOR_SYSTEM_PROMPT;
use crate::agent::stateless_llm::{BedrockLLM, StatelessLLMInterface};
use crate::config_manager::{AgentConfig, Config};
use crate::error::AgentError;
use crate::memory::{AgentCoreMemoryClient, MemoryClient, MemoryConfig, MemorySessionManager};

/// Builds one agent per invocation
pub trait AgentFactory: Send + Sync {
    /// Create an agent, attaching memory when `memory_config` is given
    fn create_agent(
        &self,
        memory_config: Option<MemoryConfig>,
    ) -> anyhow::Result<Box<dyn AgentInterface>>;
}

/// Factory for the health calculator agent
pub struct CalculatorAgentFactory {
    config: AgentConfig,
    llm: Arc<dyn StatelessLLMInterface>,
    memory_client: Option<Arc<dyn MemoryClient>>,
}

impl CalculatorAgentFactory {
    pub fn new(config: AgentConfig, llm: Arc<dyn StatelessLLMInterface>) -> Self {
        Self {
            config,
            llm,
            memory_client: None,
        }
    }

    pub fn with_memory_client(mut self, client: Arc<dyn MemoryClient>) -> Self {
        self.memory_client = Some(client);
        self
    }

    /// Wire the Bedrock model client, plus the memory client when a
    /// memory id is configured
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = Arc::new(BedrockLLM::new(&config.agent_config.model)?);
        let mut factory = Self::new(config.agent_config.clone(), llm);
        if config.memory_config.is_enabled() {
            let client = AgentCoreMemoryClient::new(&config.memory_config)?;
            factory = factory.with_memory_client(Arc::new(client));
        }
        info!(
            agent = %config.agent_config.name,
            memory = factory.memory_client.is_some(),
            "Agent factory ready"
        );
        Ok(factory)
    }

    fn system_prompt(&self) -> &str {
        self.config
            .system_prompt
            .as_deref()
            .unwrap_or(CALCULATOR_SYSTEM_PROMPT)
    }
}

impl AgentFactory for CalculatorAgentFactory {
    fn create_agent(
        &self,
        memory_config: Option<MemoryConfig>,
    ) -> anyhow::Result<Box<dyn AgentInterface>> {
        let mut agent = CalculatorAgent::new(
            self.config.name.as_str(),
            self.system_prompt(),
            self.llm.clone(),
            SlidingWindowConversationManager::new(self.config.window_size),
        );

        if let Some(memory_config) = memory_config {
            let client = self.memory_client.clone().ok_or_else(|| {
                AgentError::Construction("memory requested but no memory client is configured".to_string())
            })?;
            agent = agent.with_session_manager(MemorySessionManager::new(memory_config, client));
        }

        Ok(Box::new(agent))
    }
}
