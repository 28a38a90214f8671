use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::input_types::Identity;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_RELEVANCE_SCORE: f64 = 0.5;

/// How many records to pull from one namespace, and the minimum score a
/// record needs to be used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub relevance_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            relevance_score: DEFAULT_RELEVANCE_SCORE,
        }
    }
}

/// Addressing for the memory service, scoped to one actor and session.
/// Built per request and dropped with the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub memory_id: String,
    pub session_id: String,
    pub actor_id: String,
    /// Namespace path to retrieval settings
    pub retrieval_config: BTreeMap<String, RetrievalConfig>,
}

impl MemoryConfig {
    pub fn new(
        memory_id: impl Into<String>,
        session_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            memory_id: memory_id.into(),
            session_id: session_id.into(),
            actor_id: actor_id.into(),
            retrieval_config: BTreeMap::new(),
        }
    }

    pub fn with_retrieval(mut self, namespace: impl Into<String>, config: RetrievalConfig) -> Self {
        self.retrieval_config.insert(namespace.into(), config);
        self
    }

    /// Memory scoped to `identity`, retrieving from the actor's health
    /// metrics and preferences namespaces
    pub fn for_identity(memory_id: &str, identity: &Identity) -> Self {
        Self::new(memory_id, &identity.session_id, &identity.actor_id)
            .with_retrieval(
                health_metrics_namespace(&identity.actor_id),
                RetrievalConfig::default(),
            )
            .with_retrieval(
                preferences_namespace(&identity.actor_id),
                RetrievalConfig::default(),
            )
    }
}

pub fn health_metrics_namespace(actor_id: &str) -> String {
    format!("/users/{}/health_metrics", actor_id)
}

pub fn preferences_namespace(actor_id: &str) -> String {
    format!("/users/{}/preferences", actor_id)
}
