//! # Store Configuration
//!
//! Feature flags are supplied once as a [`StoreConfig`] and resolved at
//! construction into an immutable [`ResolvedConfig`]. Nothing about a
//! store's wiring changes after `build()`.

use serde::{Deserialize, Serialize};
use shared_bus::short_type_name;
use std::env;
use std::fmt;

/// Environment switch for the default of `enable_logging`.
pub const ENV_LOGGING: &str = "SIGNAL_STORE_LOGGING";

/// Environment switch for the default of `enable_state_history`.
pub const ENV_HISTORY: &str = "SIGNAL_STORE_HISTORY";

/// Optional capabilities of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    Events,
    EffectsAndQueries,
    Logging,
    StateHistory,
    LocalStorageSync,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Events => "events",
            Feature::EffectsAndQueries => "effects and queries",
            Feature::Logging => "logging",
            Feature::StateHistory => "state history",
            Feature::LocalStorageSync => "local storage sync",
        };
        f.write_str(name)
    }
}

/// Construction-time configuration record.
///
/// Every flag defaults to `false`. Deserializable so applications can keep
/// store wiring next to the rest of their settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store identity used for mediator attribution and persistence keys.
    /// Defaults to the state type's short name.
    pub name: Option<String>,
    pub enable_events: bool,
    pub enable_effects_and_queries: bool,
    pub enable_logging: bool,
    pub enable_state_history: bool,
    pub enable_local_storage_sync: bool,
    /// Maximum undo entries kept; the oldest entry is dropped beyond it.
    pub history_limit: Option<usize>,
}

impl StoreConfig {
    /// Config with every feature disabled and an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Defaults taken from the environment.
    ///
    /// - `SIGNAL_STORE_LOGGING`: enable logging (`1`/`true`)
    /// - `SIGNAL_STORE_HISTORY`: enable state history (`1`/`true`)
    pub fn from_env_defaults() -> Self {
        Self {
            enable_logging: env_flag(ENV_LOGGING),
            enable_state_history: env_flag(ENV_HISTORY),
            ..Self::default()
        }
    }

    /// Resolve into the immutable form used by a store of state type `S`.
    pub fn resolve<S>(&self) -> ResolvedConfig {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| short_type_name::<S>().to_string(), str::to_string);

        ResolvedConfig {
            name,
            events: self.enable_events,
            effects_and_queries: self.enable_effects_and_queries,
            logging: self.enable_logging,
            state_history: self.enable_state_history,
            local_storage_sync: self.enable_local_storage_sync,
            history_limit: self.history_limit,
        }
    }
}

fn env_flag(var: &str) -> bool {
    env::var(var)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Configuration fixed for a store's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    name: String,
    events: bool,
    effects_and_queries: bool,
    logging: bool,
    state_history: bool,
    local_storage_sync: bool,
    history_limit: Option<usize>,
}

impl ResolvedConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Events => self.events,
            Feature::EffectsAndQueries => self.effects_and_queries,
            Feature::Logging => self.logging,
            Feature::StateHistory => self.state_history,
            Feature::LocalStorageSync => self.local_storage_sync,
        }
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    /// Enabled features, in declaration order.
    pub fn features(&self) -> Vec<Feature> {
        [
            Feature::Events,
            Feature::EffectsAndQueries,
            Feature::Logging,
            Feature::StateHistory,
            Feature::LocalStorageSync,
        ]
        .into_iter()
        .filter(|feature| self.is_enabled(*feature))
        .collect()
    }
}
