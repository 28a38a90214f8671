use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::agent::input_types::Identity;

/// A single block of message content returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Message returned by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Structured result of one agent invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub message: Option<AgentMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl AgentResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: Some(AgentMessage {
                role: "assistant".to_string(),
                content: vec![ContentBlock::text(text)],
            }),
            stop_reason: Some("end_turn".to_string()),
            usage: None,
        }
    }

    /// The first content block, when it is non-empty text
    pub fn first_text(&self) -> Option<&str> {
        self.message
            .as_ref()?
            .content
            .first()?
            .as_text()
            .filter(|text| !text.is_empty())
    }

    /// All text blocks concatenated, used when recording the reply in
    /// conversation history
    pub fn joined_text(&self) -> String {
        self.message
            .iter()
            .flat_map(|message| message.content.iter())
            .filter_map(ContentBlock::as_text)
            .collect()
    }

    /// Text handed back to the caller: the first text block, or the whole
    /// response rendered as JSON when that shape is missing
    pub fn response_text(&self) -> String {
        match self.first_text() {
            Some(text) => text.to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Outbound envelope returned to the host for every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationResult {
    Success {
        response: String,
        session_id: String,
        actor_id: String,
        timestamp: Option<Value>,
    },
    Error {
        error: String,
        session_id: String,
        actor_id: String,
        timestamp: Option<Value>,
    },
}

impl InvocationResult {
    pub fn success(response: String, identity: &Identity, timestamp: Option<Value>) -> Self {
        InvocationResult::Success {
            response,
            session_id: identity.session_id.clone(),
            actor_id: identity.actor_id.clone(),
            timestamp,
        }
    }

    pub fn error(error: String, identity: &Identity, timestamp: Option<Value>) -> Self {
        InvocationResult::Error {
            error,
            session_id: identity.session_id.clone(),
            actor_id: identity.actor_id.clone(),
            timestamp,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success { .. })
    }

    pub fn session_id(&self) -> &str {
        match self {
            InvocationResult::Success { session_id, .. }
            | InvocationResult::Error { session_id, .. } => session_id,
        }
    }

    pub fn actor_id(&self) -> &str {
        match self {
            InvocationResult::Success { actor_id, .. }
            | InvocationResult::Error { actor_id, .. } => actor_id,
        }
    }
}
