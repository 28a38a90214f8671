pub mod agent;
pub mod main;
pub mod memory;
pub mod system;
pub mod utils;

pub use agent::{AgentConfig, ModelConfig};
pub use main::Config;
pub use memory::MemorySettings;
pub use system::SystemConfig;
