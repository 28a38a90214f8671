//! Managed memory integration: per-request addressing, the service client
//! and the session manager that attaches memory to an agent.

pub mod client;
pub mod config;
pub mod session_manager;

pub use client::{AgentCoreMemoryClient, MemoryClient, MemoryRecord};
pub use config::{MemoryConfig, RetrievalConfig};
pub use session_manager::MemorySessionManager;
