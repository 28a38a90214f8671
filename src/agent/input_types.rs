use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::AgentError;

/// Header carrying the end user's actor id
pub const ACTOR_ID_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Custom-Actor-Id";
/// Header carrying the runtime session id
pub const SESSION_ID_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Session-Id";

pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_ACTOR_ID: &str = "user";

/// One inbound calculation request.
///
/// Both fields are optional on the wire; a JSON `null` is treated the same
/// as a missing key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationRequest {
    pub prompt: String,
    /// Metric name to scalar value, in the order the caller sent them
    pub user_metrics: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default, rename = "userMetrics")]
    user_metrics: Option<Map<String, Value>>,
}

impl InvocationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_metrics: Map::new(),
        }
    }

    /// Parse a host-delivered payload. An absent or `null` payload is the
    /// empty request.
    pub fn from_payload(payload: Option<Value>) -> Result<Self, AgentError> {
        let value = match payload {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(value) => value,
        };
        if !value.is_object() {
            return Err(AgentError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_type_name(&value)
            )));
        }

        let raw: RawRequest = serde_json::from_value(value)
            .map_err(|e| AgentError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            prompt: raw.prompt.unwrap_or_default(),
            user_metrics: raw.user_metrics.unwrap_or_default(),
        })
    }

    /// Render the metrics as `key: value` pairs joined by `", "`.
    /// Returns `None` when there are no metrics.
    pub fn metrics_line(&self) -> Option<String> {
        if self.user_metrics.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .user_metrics
            .iter()
            .map(|(key, value)| format!("{}: {}", key, render_metric(value)))
            .collect();
        Some(parts.join(", "))
    }

    /// The prompt sent to the agent: the caller's prompt, followed by a
    /// labelled metrics line when metrics were supplied
    pub fn augmented_prompt(&self) -> String {
        match self.metrics_line() {
            Some(metrics) => format!("{}\n\nUser metrics: {}", self.prompt, metrics),
            None => self.prompt.clone(),
        }
    }
}

/// Strings are rendered bare; everything else, including nested arrays
/// and objects, as compact JSON.
fn render_metric(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Execution context supplied by the host for one call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeContext {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl RuntimeContext {
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: Value) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        headers
            .get(name)
            .or_else(|| {
                headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

/// Who a request is made for and which conversation it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub session_id: String,
    pub actor_id: String,
}

impl Identity {
    /// Resolve identity from an optional context. Never fails; missing or
    /// empty values fall back to `"default"` and `"user"`.
    pub fn resolve(context: Option<&RuntimeContext>) -> Self {
        let session_id = context
            .and_then(|ctx| ctx.session_id.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID)
            .to_string();
        let actor_id = context
            .and_then(|ctx| ctx.header(ACTOR_ID_HEADER))
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ACTOR_ID)
            .to_string();
        Self {
            session_id,
            actor_id,
        }
    }
}
