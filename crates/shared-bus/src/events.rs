//! # Store Events
//!
//! Event identities and the publication records kept by the replay ledger.

use std::any::{type_name, TypeId};
use std::fmt::{self, Debug};

/// An event that can be published through the mediator.
///
/// The implementing type *is* the event identity: every value of `E`
/// shares one registration list and one replay ledger.
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// struct CartCleared;
///
/// impl Event for CartCleared {
///     type Payload = ();
/// }
/// ```
pub trait Event: Debug + Send + Sync + 'static {
    /// Data carried alongside the event on each publication.
    /// Use `()` for events without a payload.
    type Payload: Debug + Send + Sync + 'static;

    /// Name used in logs and errors.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

/// Last path segment of a type name, without generic arguments.
///
/// `alloc::vec::Vec<app::Todo>` becomes `Vec`, `app::cart::CartState` becomes `CartState`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Identity of an event type.
#[derive(Clone, Copy)]
pub struct EventKey {
    id: TypeId,
    name: &'static str,
}

impl EventKey {
    /// Key for event type `E`.
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::name(),
        }
    }

    /// Event name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKey {}

impl std::hash::Hash for EventKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKey({})", self.name)
    }
}

/// One publication of an event, as stored in the replay ledger.
#[derive(Debug)]
pub struct Publication<E: Event> {
    /// The published event value.
    pub event: E,
    /// The payload published with it.
    pub payload: E::Payload,
    /// Mediator-wide publish sequence number (starts at 1).
    pub sequence: u64,
}
