//! # Replay Ledger
//!
//! Per-event, append-only record of every publication. Entries are
//! type-erased `Publication<E>` values shared behind `Arc`, so replay can
//! hand the same record to many handlers without cloning payloads.

use crate::events::EventKey;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A type-erased `Publication<E>`.
pub type ErasedPublication = Arc<dyn Any + Send + Sync>;

/// Ordered publication history, keyed by event identity.
#[derive(Default)]
pub struct ReplayLedger {
    entries: HashMap<EventKey, Vec<ErasedPublication>>,
}

impl ReplayLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a publication to the event's history.
    pub fn record(&mut self, key: EventKey, publication: ErasedPublication) {
        self.entries.entry(key).or_default().push(publication);
    }

    /// Snapshot of the event's history, oldest first.
    ///
    /// Returned by value so callers can release the ledger lock before
    /// invoking handlers that may publish again.
    pub fn history(&self, key: &EventKey) -> Vec<ErasedPublication> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Number of recorded publications for an event.
    pub fn len(&self, key: &EventKey) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    /// Total publications across all events.
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// True if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}
