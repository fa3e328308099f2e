//! Error types for signal stores

use crate::domain::Feature;
use crate::plugins::PluginErrors;
use shared_bus::MediatorError;
use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Soft failures (undo/redo with nothing to apply, persistence writes) are
/// not represented here: they are logged and the call returns normally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation needs a feature that was not enabled at construction.
    #[error("store `{store}`: {feature} is not enabled")]
    FeatureDisabled { store: String, feature: Feature },

    /// The store was built with an inconsistent set of collaborators.
    #[error("store `{store}` is misconfigured: {reason}")]
    Misconfigured { store: String, reason: String },

    /// A query dependency is not provided by the execution context.
    #[error("store `{store}`: dependency `{dependency}` could not be resolved")]
    UnresolvedDependency {
        store: String,
        dependency: &'static str,
    },

    /// An event handler failed during publish or replay.
    #[error(transparent)]
    Mediator(#[from] MediatorError),

    /// One or more plugin hooks failed. Every hook in the chain still ran.
    #[error(transparent)]
    Plugins(#[from] PluginErrors),

    /// The effect body returned an error.
    #[error("effect `{effect}` failed: {error}")]
    Effect {
        effect: String,
        #[source]
        error: anyhow::Error,
    },

    /// The query body returned an error.
    #[error("query `{query}` failed: {error}")]
    Query {
        query: String,
        #[source]
        error: anyhow::Error,
    },

    /// A plugin replaced an effect result with a value of another type.
    #[error("effect `{effect}` produced a result that is not `{expected}`")]
    OutputType {
        effect: String,
        expected: &'static str,
    },

    /// Removing or writing persisted state failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors from the persistence synchronizer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage backend error: {0}")]
    Storage(#[from] StorageError),

    #[error("state codec error for `{key}`: {error}")]
    Codec {
        key: String,
        #[source]
        error: serde_json::Error,
    },
}

/// Errors from storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("storage directory {path} is locked by another process")]
    Locked { path: String },
}
