use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::error::ConfigError;

/// Listener settings for the agent runtime server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl SystemConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e| ConfigError::InvalidValue {
            key: "host".to_string(),
            message: format!("{}", e),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
