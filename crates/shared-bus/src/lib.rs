//! # Shared Bus - Event Mediator for Inter-Store Communication
//!
//! A process-wide publish/subscribe registry that lets signal stores notify
//! each other without holding direct references.
//!
//! ## Rules
//!
//! - Every store in a process talks to the **same** mediator instance
//!   (either [`EventMediator::global`] or one explicitly shared `Arc`).
//! - Registrations are permanent: there is no unregister.
//! - Handlers run synchronously, on the publisher's thread, in registration order.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Store A    │                    │   Store B    │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │   Mediator   │ ─────────┘
//!                  │  + ledger    │  handler(event, payload)
//!                  └──────────────┘
//! ```
//!
//! ## Replay
//!
//! Every publication is appended to a per-event ledger. A late subscriber can
//! call [`EventMediator::replay`] to receive the backlog, in publish order.
//!
//! ## Initialization Order
//!
//! The global mediator is created lazily on first access and lives until the
//! process exits. Stores capture their mediator at construction, so a test
//! that wants isolation must pass its own `Arc<EventMediator>` to every store
//! it builds.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod events;
pub mod ledger;
pub mod mediator;

// Re-export main types
pub use error::MediatorError;
pub use events::{short_type_name, Event, EventKey, Publication};
pub use ledger::ReplayLedger;
pub use mediator::{EventMediator, RegistrationId};
