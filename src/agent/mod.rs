pub mod agent_model;
pub mod error;
pub mod page_agent;
