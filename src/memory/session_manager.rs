use std::sync::Arc;
use tracing::{debug, warn};

use super::client::{MemoryClient, MemoryRecord};
use super::config::MemoryConfig;
use crate::agent::conversation::Message;

/// Connects one agent instance to the memory service for a single
/// actor/session.
///
/// Memory only enriches an invocation. Failures talking to the service are
/// logged and the agent carries on without the missing context.
pub struct MemorySessionManager {
    config: MemoryConfig,
    client: Arc<dyn MemoryClient>,
}

impl MemorySessionManager {
    pub fn new(config: MemoryConfig, client: Arc<dyn MemoryClient>) -> Self {
        debug!(
            memory_id = %config.memory_id,
            session_id = %config.session_id,
            actor_id = %config.actor_id,
            "Memory session manager attached"
        );
        Self { config, client }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Prior turns of this session, at most `max_messages`
    pub async fn load_history(&self, max_messages: usize) -> Vec<Message> {
        let result = self
            .client
            .list_events(
                &self.config.memory_id,
                &self.config.actor_id,
                &self.config.session_id,
                max_messages,
            )
            .await;

        match result {
            Ok(mut messages) => {
                if messages.len() > max_messages {
                    messages.drain(..messages.len() - max_messages);
                }
                debug!(count = messages.len(), "Loaded session history");
                messages
            }
            Err(e) => {
                warn!(error = %e, session_id = %self.config.session_id, "Failed to load session history");
                Vec::new()
            }
        }
    }

    /// Records relevant to `query` from every configured namespace, each
    /// namespace filtered by its relevance threshold and capped at `top_k`
    pub async fn retrieve_context(&self, query: &str) -> Vec<MemoryRecord> {
        let lookups = self.config.retrieval_config.iter().map(|(namespace, retrieval)| async move {
            let result = self
                .client
                .retrieve_memory_records(&self.config.memory_id, namespace, query, retrieval.top_k)
                .await;
            match result {
                Ok(records) => records
                    .into_iter()
                    .filter(|record| {
                        record.score.unwrap_or(0.0) >= retrieval.relevance_score
                    })
                    .take(retrieval.top_k)
                    .collect(),
                Err(e) => {
                    warn!(error = %e, namespace = %namespace, "Memory retrieval failed");
                    Vec::new()
                }
            }
        });

        let records: Vec<MemoryRecord> = futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect();
        debug!(count = records.len(), "Retrieved memory context");
        records
    }

    /// Prefix `prompt` with a context block listing `records`
    pub fn augment_prompt(prompt: &str, records: &[MemoryRecord]) -> String {
        if records.is_empty() {
            return prompt.to_string();
        }
        let facts: Vec<String> = records
            .iter()
            .map(|record| format!("- {}", record.content))
            .collect();
        format!(
            "<user_context>\n{}\n</user_context>\n\n{}",
            facts.join("\n"),
            prompt
        )
    }

    /// Store one user/assistant exchange
    pub async fn record_turn(&self, user: &Message, assistant: &Message) {
        let messages = [user.clone(), assistant.clone()];
        if let Err(e) = self
            .client
            .create_event(
                &self.config.memory_id,
                &self.config.actor_id,
                &self.config.session_id,
                &messages,
            )
            .await
        {
            warn!(error = %e, session_id = %self.config.session_id, "Failed to record conversation turn");
        }
    }
}
