use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config_manager::agent::AgentConfig;
use crate::config_manager::memory::MemorySettings;
use crate::config_manager::system::SystemConfig;
use crate::config_manager::utils::read_config_file;
use crate::error::ConfigError;

/// Process-wide configuration, read once at startup and immutable afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(default)]
    pub agent_config: AgentConfig,

    #[serde(default)]
    pub memory_config: MemorySettings,
}

impl Config {
    /// Load configuration from a YAML or JSON file, substituting `${VAR}`
    /// references from the process environment
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = read_config_file(path, lookup)?;
        let mut config: Config = serde_json::from_value(value)?;
        // one region serves both the model and memory unless memory overrides it
        if config.memory_config.region.is_none() {
            config.memory_config.region = Some(config.agent_config.model.region.clone());
        }
        config.agent_config.validate()?;
        Ok(config)
    }

    /// Configuration for a process entrypoint: the file named by
    /// `CONFIG_PATH` when set, otherwise environment variables
    pub fn from_process() -> Result<Self, ConfigError> {
        match std::env::var("CONFIG_PATH") {
            Ok(path) if !path.is_empty() => {
                let config = Self::load(&path)?;
                info!("Loaded configuration from: {}", path);
                Ok(config)
            }
            _ => Self::from_env(),
        }
    }

    /// Build configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(host) = get("HOST") {
            config.system_config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.system_config.port = port.parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("{}", e),
            })?;
        }

        let model = &mut config.agent_config.model;
        if let Some(model_id) = get("MODEL_ID") {
            model.model_id = model_id;
        }
        if let Some(region) = get("AWS_REGION") {
            model.region = region;
        }
        model.endpoint = get("BEDROCK_RUNTIME_ENDPOINT");
        model.llm_api_key = get("AWS_BEARER_TOKEN_BEDROCK");

        config.memory_config = MemorySettings {
            memory_id: get("BEDROCK_AGENTCORE_MEMORY_ID"),
            region: Some(config.agent_config.model.region.clone()),
            endpoint: get("AGENTCORE_MEMORY_ENDPOINT"),
            api_key: get("AGENTCORE_MEMORY_TOKEN"),
        };

        config.agent_config.validate()?;
        debug!(
            model_id = %config.agent_config.model.model_id,
            memory_enabled = config.memory_config.is_enabled(),
            "Built configuration from environment"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_manager::agent::DEFAULT_MODEL_ID;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let vars = HashMap::new();
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.agent_config.model.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.agent_config.model.region, "us-east-1");
        assert_eq!(config.system_config.port, 8080);
        assert!(!config.memory_config.is_enabled());
    }

    #[test]
    fn memory_id_enables_memory() {
        let vars = HashMap::from([
            ("BEDROCK_AGENTCORE_MEMORY_ID", "test-memory-123"),
            ("AWS_REGION", "us-west-2"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.memory_config.memory_id(), Some("test-memory-123"));
        assert_eq!(config.memory_config.region(), "us-west-2");
    }

    #[test]
    fn empty_memory_id_keeps_memory_disabled() {
        let vars = HashMap::from([("BEDROCK_AGENTCORE_MEMORY_ID", "")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(!config.memory_config.is_enabled());
    }

    #[test]
    fn bad_port_is_rejected() {
        let vars = HashMap::from([("PORT", "eighty")]);
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn loads_partial_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"agent_config": {{"window_size": 4, "model": {{"model_id": "${{MODEL}}"}}}}}}"#
        )
        .unwrap();

        let vars = HashMap::from([("MODEL", "anthropic.claude-test")]);
        let config = Config::load_with(file.path().to_str().unwrap(), lookup(&vars)).unwrap();
        assert_eq!(config.agent_config.window_size, 4);
        assert_eq!(config.agent_config.model.model_id, "anthropic.claude-test");
        assert_eq!(config.agent_config.model.max_tokens, 2000);
        assert_eq!(config.system_config.port, 8080);
    }

    #[test]
    fn file_model_region_applies_to_memory() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "agent_config:\n  model:\n    region: eu-west-1\nmemory_config:\n  memory_id: mem-1\n"
        )
        .unwrap();

        let vars = HashMap::new();
        let config = Config::load_with(file.path().to_str().unwrap(), lookup(&vars)).unwrap();
        assert_eq!(config.agent_config.model.region, "eu-west-1");
        assert_eq!(config.memory_config.region(), "eu-west-1");
        assert_eq!(
            config.memory_config.endpoint(),
            "https://bedrock-agentcore.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn file_memory_region_overrides_model_region() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "agent_config:\n  model:\n    region: eu-west-1\nmemory_config:\n  memory_id: mem-1\n  region: us-west-2\n"
        )
        .unwrap();

        let vars = HashMap::new();
        let config = Config::load_with(file.path().to_str().unwrap(), lookup(&vars)).unwrap();
        assert_eq!(config.memory_config.region(), "us-west-2");
    }
}
