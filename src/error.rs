use thiserror::Error;

/// Failures raised while turning a request into an agent reply.
///
/// The handler never surfaces these to the host as-is; every variant ends
/// up rendered into the `error` field of the result envelope.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("model request failed: {0}")]
    Model(String),

    #[error("model authentication failed (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("model rate limited: {0}")]
    RateLimited(String),

    #[error("failed to parse model response: {0}")]
    Deserialization(String),

    #[error("memory service error: {0}")]
    Memory(String),

    #[error("agent construction failed: {0}")]
    Construction(String),
}

/// Startup configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(String),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}
