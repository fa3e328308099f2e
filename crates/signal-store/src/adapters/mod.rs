//! Adapters Layer
//!
//! Concrete implementations of the outbound ports:
//! - `InMemoryStorage` / `FileStorage`: `StorageBackend`
//! - `TracingLogSink` / `MemoryLogSink`: `LogSink`
//! - `Injector`: `ExecutionContext`

pub mod file_storage;
pub mod injector;
pub mod log_sink;
pub mod memory_storage;

pub use file_storage::FileStorage;
pub use injector::{in_context, inject, ContextScope, Injector};
pub use log_sink::{LogEntry, MemoryLogSink, TracingLogSink};
pub use memory_storage::InMemoryStorage;
