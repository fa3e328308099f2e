//! # Signal Store
//!
//! Reactive state containers for UI applications. A store holds one value
//! of type `S` and replaces it on every change; optional features are fixed
//! when the store is built.
//!
//! | Feature | Builder | What it adds |
//! |---------|---------|--------------|
//! | State history | `with_history()` | `undo` / `redo` / `history` |
//! | Events | `with_events(mediator)` | `register_handler` / `publish` across stores |
//! | Effects and queries | `with_effects(context)` | `run_effect` in a scope, `run_query` with resolved dependencies |
//! | Logging | `with_logging(sink)` | every change reported to a `LogSink` |
//! | Local storage sync | `with_persistence(backend)` | state restored on build, saved on change |
//!
//! Plugins (`PluginRegistry` → `PluginChain`) wrap construction, command
//! dispatch and effects for every store that shares the chain.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Config, history, state cell, commands
//! - `ports/` - `StoreHandle` (inbound), storage / logging / context (outbound)
//! - `adapters/` - In-memory and file storage, log sinks, injector
//! - `plugins/` - Interceptor chain
//! - `effects` - Effect and query contracts
//! - `service/` - The store, its builder, the persistence synchronizer
//!
//! ## Usage
//!
//! ```ignore
//! use signal_store::Store;
//!
//! let counter = Store::builder(0u32).name("counter").with_history().build()?;
//!
//! counter.update_named(|n| n + 1, "inc");
//! counter.update_named(|n| n + 1, "inc");
//! assert_eq!(*counter.state(), 2);
//!
//! counter.undo();
//! assert_eq!(*counter.state(), 1);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod effects;
pub mod error;
pub mod plugins;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::{
    in_context, inject, FileStorage, InMemoryStorage, Injector, LogEntry, MemoryLogSink,
    TracingLogSink,
};
pub use domain::{
    Command, CommandFn, Feature, HistoryEntry, ResolvedConfig, StoreConfig, StoreState,
    UNSPECIFIED_COMMAND,
};
pub use effects::{Dependencies, Effect, EffectFn, EffectInfo, EffectOutput, Query, QueryFn};
pub use error::{PersistenceError, StorageError, StoreError};
pub use plugins::{HookStage, PluginChain, PluginErrors, PluginFailure, PluginRegistry, StorePlugin};
pub use ports::{ExecutionContext, LogSink, StorageBackend, StoreHandle};
pub use service::{PersistenceSynchronizer, Store, StoreBuilder};

// Re-export the mediator so applications need only one dependency
pub use shared_bus::{Event, EventMediator, MediatorError, RegistrationId};
