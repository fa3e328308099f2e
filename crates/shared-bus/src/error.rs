//! Error types for the event mediator

use thiserror::Error;

/// Errors surfaced by publish and replay.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// A handler returned an error. Dispatch stops at the failing handler;
    /// the registration list and the ledger are left intact.
    #[error("handler registered by `{subscriber}` failed on `{event}`: {error}")]
    Handler {
        event: &'static str,
        subscriber: String,
        #[source]
        error: anyhow::Error,
    },
}

impl MediatorError {
    /// Name of the store whose handler failed.
    pub fn subscriber(&self) -> &str {
        match self {
            MediatorError::Handler { subscriber, .. } => subscriber,
        }
    }
}
