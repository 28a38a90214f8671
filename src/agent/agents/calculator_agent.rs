use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::agent_interface::AgentInterface;
use crate::agent::conversation::{Message, SlidingWindowConversationManager};
use crate::agent::output_types::AgentResponse;
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::memory::MemorySessionManager;

/// Health calculator agent.
///
/// Holds a bounded conversation history and, when memory is attached,
/// seeds that history from the session and enriches every prompt with
/// facts retrieved for the actor.
pub struct CalculatorAgent {
    name: String,
    system_prompt: String,
    llm: Arc<dyn StatelessLLMInterface>,
    conversation_manager: SlidingWindowConversationManager,
    messages: Vec<Message>,
    session_manager: Option<MemorySessionManager>,
    history_loaded: bool,
}

impl CalculatorAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        llm: Arc<dyn StatelessLLMInterface>,
        conversation_manager: SlidingWindowConversationManager,
    ) -> Self {
        let name = name.into();
        info!("{} initialized.", name);
        Self {
            name,
            system_prompt: system_prompt.into(),
            llm,
            conversation_manager,
            messages: Vec::new(),
            session_manager: None,
            history_loaded: false,
        }
    }

    pub fn with_session_manager(mut self, session_manager: MemorySessionManager) -> Self {
        self.session_manager = Some(session_manager);
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session_manager(&self) -> Option<&MemorySessionManager> {
        self.session_manager.as_ref()
    }

    async fn ensure_history(&mut self) {
        if self.history_loaded {
            return;
        }
        self.history_loaded = true;
        if let Some(session_manager) = &self.session_manager {
            let history = session_manager
                .load_history(self.conversation_manager.window_size())
                .await;
            let mut seeded = history;
            seeded.append(&mut self.messages);
            self.messages = seeded;
            self.conversation_manager.apply_management(&mut self.messages);
        }
    }

    /// The user message as the model sees it, with memory context prefixed
    async fn model_prompt(&self, prompt: &str) -> String {
        match &self.session_manager {
            Some(session_manager) => {
                let records = session_manager.retrieve_context(prompt).await;
                MemorySessionManager::augment_prompt(prompt, &records)
            }
            None => prompt.to_string(),
        }
    }
}

#[async_trait]
impl AgentInterface for CalculatorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&mut self, prompt: &str) -> anyhow::Result<AgentResponse> {
        self.ensure_history().await;
        let model_prompt = self.model_prompt(prompt).await;

        self.messages.push(Message::user(prompt));
        self.conversation_manager.apply_management(&mut self.messages);

        let mut request = self.messages.clone();
        if let Some(last) = request.last_mut() {
            last.content = model_prompt;
        }

        debug!(agent = %self.name, messages = request.len(), "Invoking model");
        let result = self
            .llm
            .chat_completion(&request, Some(&self.system_prompt))
            .await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.messages.pop();
                return Err(e);
            }
        };

        let reply = match response.joined_text() {
            text if text.is_empty() => response.response_text(),
            text => text,
        };
        self.messages.push(Message::assistant(reply.clone()));
        self.conversation_manager.apply_management(&mut self.messages);

        if let Some(session_manager) = &self.session_manager {
            session_manager
                .record_turn(&Message::user(prompt), &Message::assistant(reply))
                .await;
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::conversation::Role;
    use crate::agent::stateless_llm::stateless_llm_interface::tests::FakeLLM;
    use crate::memory::session_manager::tests::{record, FakeMemoryClient};
    use crate::memory::{MemoryConfig, RetrievalConfig};

    fn agent(llm: Arc<FakeLLM>, window: usize) -> CalculatorAgent {
        CalculatorAgent::new(
            "CalculatorAgent",
            "You are a calculator.",
            llm,
            SlidingWindowConversationManager::new(window),
        )
    }

    #[tokio::test]
    async fn sends_prompt_with_system_prompt() {
        let llm = Arc::new(FakeLLM::replying("Your BMI is 22.9."));
        let mut agent = agent(llm.clone(), 10);

        let response = agent.invoke("Calculate my BMI").await.unwrap();

        assert_eq!(response.first_text(), Some("Your BMI is 22.9."));
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0, vec![Message::user("Calculate my BMI")]);
        assert_eq!(calls[0].1.as_deref(), Some("You are a calculator."));
        assert_eq!(agent.messages().len(), 2);
        assert_eq!(agent.messages()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn history_stays_within_window() {
        let llm = Arc::new(FakeLLM::replying("ok"));
        let mut agent = agent(llm.clone(), 4);

        for i in 0..5 {
            agent.invoke(&format!("q{}", i)).await.unwrap();
        }

        assert!(agent.messages().len() <= 4);
        assert_eq!(agent.messages()[0].role, Role::User);
        let last_call = llm.calls.lock().unwrap().last().unwrap().0.clone();
        assert!(last_call.len() <= 4);
        assert_eq!(last_call.last().unwrap(), &Message::user("q4"));
    }

    #[tokio::test]
    async fn failed_call_leaves_no_dangling_user_turn() {
        let llm = Arc::new(FakeLLM::failing("Agent processing failed"));
        let mut agent = agent(llm, 10);

        let err = agent.invoke("Calculate BMI").await.unwrap_err();

        assert_eq!(err.to_string(), "Agent processing failed");
        assert!(agent.messages().is_empty());
    }

    #[tokio::test]
    async fn memory_seeds_history_and_enriches_prompt() {
        let memory = Arc::new(FakeMemoryClient {
            history: vec![
                Message::user("My height is 175cm"),
                Message::assistant("Noted."),
            ],
            records: vec![record("/users/u-1/health_metrics", "weight 70kg", 0.8)],
            ..Default::default()
        });
        let config = MemoryConfig::new("mem-1", "s-1", "u-1")
            .with_retrieval("/users/u-1/health_metrics", RetrievalConfig::default());
        let llm = Arc::new(FakeLLM::replying("Your BMI is 22.9."));
        let mut agent = agent(llm.clone(), 10)
            .with_session_manager(MemorySessionManager::new(config, memory.clone()));

        agent.invoke("What is my BMI?").await.unwrap();

        let calls = llm.calls.lock().unwrap();
        let sent = &calls[0].0;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], Message::user("My height is 175cm"));
        assert!(sent[2].content.contains("- weight 70kg"));
        assert!(sent[2].content.ends_with("What is my BMI?"));

        // history keeps the caller's prompt without retrieved context
        assert_eq!(agent.messages()[2], Message::user("What is my BMI?"));

        let created = memory.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].2,
            vec![
                Message::user("What is my BMI?"),
                Message::assistant("Your BMI is 22.9.")
            ]
        );
    }
}
