use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Replace `${VAR_NAME}` occurrences using `lookup`.
/// Unknown variables are left in place.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        let whole = &caps[0];
        lookup(&caps[1]).unwrap_or_else(|| whole.to_string())
    });
    Ok(replaced.into_owned())
}

/// Read a YAML or JSON configuration file with variable substitution.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn read_config_file<F>(config_path: &str, lookup: F) -> Result<Value, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = Path::new(config_path);
    if !path.exists() {
        return Err(ConfigError::NotFound(config_path.to_string()));
    }

    let raw = fs::read_to_string(path)?;
    let content = substitute_env_vars(raw.trim_start_matches('\u{feff}'), lookup)?;

    let value = if config_path.to_lowercase().ends_with(".json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    debug!("Read configuration file {}", config_path);
    Ok(value)
}
