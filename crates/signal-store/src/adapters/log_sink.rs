//! Logging sink adapters
//!
//! - `TracingLogSink`: default, forwards to `tracing` under target `signal_store::log`
//! - `MemoryLogSink`: captures entries for assertions

use crate::ports::LogSink;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

/// Forwards store activity to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, context: &str, action: &str, data: &[Value]) {
        let data = Value::Array(data.to_vec());
        info!(target: "signal_store::log", store = context, action, %data, "store activity");
    }
}

/// One captured log entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub context: String,
    pub action: String,
    pub data: Vec<Value>,
}

/// Keeps every entry in memory.
#[derive(Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Actions logged for `context`, oldest first.
    pub fn actions_for(&self, context: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.context == context)
            .map(|entry| entry.action.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, context: &str, action: &str, data: &[Value]) {
        self.entries.lock().push(LogEntry {
            context: context.to_string(),
            action: action.to_string(),
            data: data.to_vec(),
        });
    }
}
