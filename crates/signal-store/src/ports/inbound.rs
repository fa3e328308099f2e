//! Inbound Ports (Driving Ports)
//!
//! Plugins are shared by stores of every state type, so they see a store
//! through this object-safe view rather than `Store<S>` itself.

use crate::domain::ResolvedConfig;
use serde_json::Value;
use std::any::Any;

/// Type-erased view of a store.
pub trait StoreHandle: Send + Sync {
    /// Store name.
    fn name(&self) -> &str;

    /// Resolved configuration.
    fn config(&self) -> &ResolvedConfig;

    /// Current state as JSON, `None` if it cannot be encoded.
    fn state_json(&self) -> Option<Value>;

    /// Number of undoable commands (0 when history is disabled).
    fn history_len(&self) -> usize;

    /// Downcast hook for plugins that know the concrete store type.
    fn as_any(&self) -> &dyn Any;
}
