use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::DEFAULT_REGION;

/// Configuration for the managed memory service.
///
/// Memory integration is attached to an invocation only when `memory_id`
/// is set and non-empty.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct MemorySettings {
    #[serde(default)]
    pub memory_id: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Overrides the regional memory data-plane endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl MemorySettings {
    /// The configured memory id, if memory is enabled
    pub fn memory_id(&self) -> Option<&str> {
        self.memory_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.memory_id().is_some()
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-agentcore.{}.amazonaws.com", self.region()),
        }
    }
}

impl fmt::Debug for MemorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySettings")
            .field("memory_id", &self.memory_id)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
