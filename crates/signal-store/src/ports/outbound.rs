//! Outbound Ports (Driven Ports)
//!
//! Collaborators a store depends on but does not implement:
//! - `StorageBackend`: durable string key/value storage
//! - `LogSink`: destination for store activity logs
//! - `ExecutionContext`: scoped service resolution for effects and queries

use crate::error::StorageError;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Durable key/value storage (Driven Port).
///
/// Production: `FileStorage`. Tests: `InMemoryStorage`.
pub trait StorageBackend: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Destination for store activity logs (Driven Port).
///
/// Implementations must not panic; logging can never fail a store operation.
pub trait LogSink: Send + Sync {
    /// Record `action` performed in `context` (usually a store name).
    fn log(&self, context: &str, action: &str, data: &[Value]);
}

/// Scoped resolution context for effects and queries (Driven Port).
pub trait ExecutionContext: Send + Sync {
    /// Run `f` with this context installed as the current one, so code inside
    /// can resolve collaborators with [`crate::inject`].
    fn run_scoped(self: Arc<Self>, f: &mut dyn FnMut());

    /// Singleton registered for `type_id`, if any.
    fn resolve_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Typed resolution through an execution context.
pub fn resolve<T: Any + Send + Sync>(context: &dyn ExecutionContext) -> Option<Arc<T>> {
    context
        .resolve_any(TypeId::of::<T>())
        .and_then(|service| service.downcast::<T>().ok())
}
