use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the hosted model behind the agent
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Overrides the regional Bedrock runtime endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing)]
    pub llm_api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            region: default_region(),
            endpoint: None,
            llm_api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model_id", &self.model_id)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .finish()
    }
}

/// Configuration for the calculator agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Replaces the built-in calculator prompt when set
    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default)]
    pub model: ModelConfig,
}

fn default_agent_name() -> String {
    "CalculatorAgent".to_string()
}

fn default_window_size() -> usize {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            system_prompt: None,
            window_size: default_window_size(),
            model: ModelConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(invalid("agent_config.window_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(invalid("agent_config.model.temperature", "must be between 0 and 1"));
        }
        if !(self.model.top_p > 0.0 && self.model.top_p <= 1.0) {
            return Err(invalid("agent_config.model.top_p", "must be in (0, 1]"));
        }
        if self.model.max_tokens == 0 {
            return Err(invalid("agent_config.model.max_tokens", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calculator_profile() {
        let config = AgentConfig::default();
        assert_eq!(config.name, "CalculatorAgent");
        assert_eq!(config.window_size, 10);
        assert_eq!(config.model.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.model.max_tokens, 2000);
        assert!((config.model.temperature - 0.1).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = AgentConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let model = ModelConfig {
            llm_api_key: Some("top-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", model);
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
