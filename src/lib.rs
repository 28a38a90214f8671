pub mod agent;
pub mod config_manager;
pub mod error;
pub mod handlers;
pub mod lambda;
pub mod memory;
pub mod routes;
pub mod state;
