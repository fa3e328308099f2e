//! # Event Mediator
//!
//! Synchronous publish/subscribe registry shared by every store in a process.
//!
//! ## Reentrancy
//!
//! A handler may publish, register, or replay while it is being dispatched.
//! The mediator never holds a lock while a handler runs: dispatch iterates a
//! snapshot of the registration list taken when `publish` was called, so a
//! registration added mid-dispatch is only seen by later publications.

use crate::error::MediatorError;
use crate::events::{Event, EventKey, Publication};
use crate::ledger::{ErasedPublication, ReplayLedger};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

lazy_static! {
    static ref GLOBAL_MEDIATOR: Arc<EventMediator> = Arc::new(EventMediator::new());
}

type ErasedHandler = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> anyhow::Result<()> + Send + Sync>;

/// Handle identifying one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

impl RegistrationId {
    /// Raw registration number; registrations are numbered in creation order.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
struct Registration {
    id: RegistrationId,
    key: EventKey,
    source: Arc<str>,
    handler: ErasedHandler,
}

/// Process-wide publish/subscribe registry with a replay ledger.
pub struct EventMediator {
    /// Registrations per event, in insertion order.
    registrations: RwLock<HashMap<EventKey, Vec<Registration>>>,

    /// Every publication, per event, in publish order.
    ledger: RwLock<ReplayLedger>,

    /// Next registration number.
    next_registration: AtomicU64,

    /// Total publications (also the sequence of the latest one).
    published: AtomicU64,
}

impl EventMediator {
    /// Create an isolated mediator.
    ///
    /// Most applications use [`EventMediator::global`]; an explicit instance
    /// is useful in tests and for embedding several independent store graphs.
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            ledger: RwLock::new(ReplayLedger::new()),
            next_registration: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }

    /// The lazily-created process-wide mediator.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_MEDIATOR)
    }

    /// Register `handler` for event `E` on behalf of `source`.
    ///
    /// The registration is permanent.
    pub fn register<E, F>(&self, source: &str, handler: F) -> RegistrationId
    where
        E: Event,
        F: Fn(&E, &E::Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let key = EventKey::of::<E>();
        let id = RegistrationId(self.next_registration.fetch_add(1, Ordering::Relaxed));

        let erased: ErasedHandler = Arc::new(move |record: &(dyn Any + Send + Sync)| {
            match record.downcast_ref::<Publication<E>>() {
                Some(publication) => handler(&publication.event, &publication.payload),
                // Records are filed under their own event key, so this cannot match.
                None => Ok(()),
            }
        });

        self.registrations
            .write()
            .entry(key)
            .or_default()
            .push(Registration {
                id,
                key,
                source: Arc::from(source),
                handler: erased,
            });

        debug!(event = key.name(), source, registration = id.0, "Handler registered");
        id
    }

    /// Publish `event` with `payload` to every handler registered for `E`.
    ///
    /// Handlers run synchronously in registration order. The publication is
    /// recorded in the ledger before dispatch, so the ledger order always
    /// matches publish order even when a handler publishes again.
    ///
    /// # Returns
    ///
    /// The source name of every handler that ran, in invocation order.
    ///
    /// # Errors
    ///
    /// The first handler error stops dispatch and is returned; handlers later
    /// in the list are not invoked for this publication.
    pub fn publish<E: Event>(
        &self,
        event: E,
        payload: E::Payload,
    ) -> Result<Vec<String>, MediatorError> {
        let key = EventKey::of::<E>();
        let sequence = self.published.fetch_add(1, Ordering::Relaxed) + 1;

        let record: ErasedPublication = Arc::new(Publication {
            event,
            payload,
            sequence,
        });
        self.ledger.write().record(key, Arc::clone(&record));

        let targets = self.snapshot(&key);
        let mut handled = Vec::with_capacity(targets.len());

        for registration in &targets {
            invoke(registration, &record)?;
            handled.push(registration.source.to_string());
        }

        debug!(
            event = key.name(),
            sequence,
            handlers = handled.len(),
            "Event published"
        );
        Ok(handled)
    }

    /// Replay past publications to every registration owned by `source`.
    ///
    /// Registrations are visited in creation order; each one receives its
    /// event's full history, oldest first. Two handlers registered by the same
    /// source for the same event each receive the whole history.
    ///
    /// # Returns
    ///
    /// Number of handler invocations performed.
    pub fn replay(&self, source: &str) -> Result<usize, MediatorError> {
        let mut owned: Vec<Registration> = self
            .registrations
            .read()
            .values()
            .flatten()
            .filter(|registration| &*registration.source == source)
            .cloned()
            .collect();
        owned.sort_by_key(|registration| registration.id);

        let mut invocations = 0;
        for registration in &owned {
            let history = self.ledger.read().history(&registration.key);
            for record in &history {
                invoke(registration, record)?;
                invocations += 1;
            }
        }

        debug!(source, registrations = owned.len(), invocations, "Replay complete");
        Ok(invocations)
    }

    /// Number of handlers registered for `E`.
    pub fn registration_count<E: Event>(&self) -> usize {
        self.registrations
            .read()
            .get(&EventKey::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Sources of the handlers registered for `E`, in registration order.
    pub fn sources_for<E: Event>(&self) -> Vec<String> {
        self.snapshot(&EventKey::of::<E>())
            .iter()
            .map(|registration| registration.source.to_string())
            .collect()
    }

    /// Number of recorded publications of `E`.
    pub fn ledger_len<E: Event>(&self) -> usize {
        self.ledger.read().len(&EventKey::of::<E>())
    }

    /// Total publications since the mediator was created.
    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn snapshot(&self, key: &EventKey) -> Vec<Registration> {
        self.registrations
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for EventMediator {
    fn default() -> Self {
        Self::new()
    }
}

fn invoke(registration: &Registration, record: &ErasedPublication) -> Result<(), MediatorError> {
    trace!(
        event = registration.key.name(),
        source = %registration.source,
        "Dispatching to handler"
    );
    (registration.handler)(&**record).map_err(|error| MediatorError::Handler {
        event: registration.key.name(),
        subscriber: registration.source.to_string(),
        error,
    })
}
