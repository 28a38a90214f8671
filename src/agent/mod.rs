pub mod agent_factory;
pub mod conversation;
pub mod input_types;
pub mod output_types;
pub mod prompts;

pub mod agents;
pub mod stateless_llm;

pub use agent_factory::*;
pub use agents::*;
pub use conversation::*;
pub use input_types::*;
pub use output_types::*;
pub use stateless_llm::*;
