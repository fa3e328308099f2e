//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - the type-erased store view handed to plugins
//! - Driven Ports (outbound) - storage backend, logging sink, execution context

pub mod inbound;
pub mod outbound;

pub use inbound::StoreHandle;
pub use outbound::{resolve, ExecutionContext, LogSink, StorageBackend};
