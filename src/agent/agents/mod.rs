pub mod agent_interface;
pub mod calculator_agent;

pub use agent_interface::*;
pub use calculator_agent::*;
