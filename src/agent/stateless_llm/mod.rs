pub mod bedrock_llm;
pub mod stateless_llm_interface;

pub use bedrock_llm::*;
pub use stateless_llm_interface::*;
