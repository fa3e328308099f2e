//! Cross-crate integration tests.

pub mod counter_flow;
pub mod cross_store_events;
pub mod effects_queries;
pub mod plugin_chain;
