//! # Plugin Interceptor Chain
//!
//! Cross-cutting hooks run around store construction, command dispatch and
//! effect execution. Plugins are collected in a [`PluginRegistry`] and frozen
//! into one [`PluginChain`] that every store shares.
//!
//! ## Ordering
//!
//! Highest precedence first; plugins of equal precedence keep registration
//! order. The order never changes once the chain is built.
//!
//! ## Failures
//!
//! A failing hook never stops the hooks after it. Failures are collected for
//! the whole chain run and the store returns them together as
//! `StoreError::Plugins` once the operation has finished.
//!
//! ```text
//! dispatch(cmd)
//!   ├── preprocess_command   P10 → P5 → P0
//!   ├── apply + commit
//!   └── postprocess_command  P10 → P5 → P0
//! ```

use crate::effects::{EffectInfo, EffectOutput};
use crate::ports::StoreHandle;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A set of optional hooks. Every hook defaults to a no-op.
pub trait StorePlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs earlier.
    fn precedence(&self) -> i32 {
        0
    }

    /// Once per store, after it is fully constructed.
    fn init(&self, _store: &dyn StoreHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn preprocess_command(&self, _store: &dyn StoreHandle, _command: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn postprocess_command(&self, _store: &dyn StoreHandle, _command: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn preprocess_effect(
        &self,
        _store: &dyn StoreHandle,
        _effect: &EffectInfo<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Inspect or transform the effect result. `output` holds whatever the
    /// previous plugin left there.
    fn postprocess_effect(
        &self,
        _store: &dyn StoreHandle,
        _effect: &EffectInfo<'_>,
        _output: &mut EffectOutput,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Extension point a hook failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    Init,
    PreprocessCommand,
    PostprocessCommand,
    PreprocessEffect,
    PostprocessEffect,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            HookStage::Init => "init",
            HookStage::PreprocessCommand => "preprocess_command",
            HookStage::PostprocessCommand => "postprocess_command",
            HookStage::PreprocessEffect => "preprocess_effect",
            HookStage::PostprocessEffect => "postprocess_effect",
        };
        f.write_str(stage)
    }
}

/// One failed hook.
#[derive(Debug, Error)]
#[error("plugin `{plugin}` failed in {stage}: {error}")]
pub struct PluginFailure {
    pub plugin: String,
    pub stage: HookStage,
    #[source]
    pub error: anyhow::Error,
}

/// Every hook failure of one store operation, in chain order.
#[derive(Debug, Error)]
#[error("{} plugin hook(s) failed: {}", .failures.len(), summarize(.failures))]
pub struct PluginErrors {
    pub failures: Vec<PluginFailure>,
}

impl PluginErrors {
    pub fn new(failures: Vec<PluginFailure>) -> Self {
        Self { failures }
    }

    /// Names of the failing plugins, in chain order.
    pub fn plugins(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.plugin.as_str()).collect()
    }
}

fn summarize(failures: &[PluginFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{} ({})", failure.plugin, failure.stage))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Collects plugins before the chain is frozen.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn StorePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, plugin: impl StorePlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn register_arc(mut self, plugin: Arc<dyn StorePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Freeze into a chain ordered by descending precedence.
    pub fn build(self) -> Arc<PluginChain> {
        let mut plugins = self.plugins;
        // sort_by_key is stable: equal precedence keeps registration order
        plugins.sort_by_key(|plugin| Reverse(plugin.precedence()));

        debug!(
            plugins = ?plugins.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            "Plugin chain built"
        );
        Arc::new(PluginChain { plugins })
    }
}

// =============================================================================
// CHAIN
// =============================================================================

/// Immutable, ordered plugin list shared by stores.
pub struct PluginChain {
    plugins: Vec<Arc<dyn StorePlugin>>,
}

impl PluginChain {
    /// Chain without plugins.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            plugins: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn run_init(&self, store: &dyn StoreHandle) -> Vec<PluginFailure> {
        self.run(HookStage::Init, |plugin| plugin.init(store))
    }

    pub fn before_command(&self, store: &dyn StoreHandle, command: &str) -> Vec<PluginFailure> {
        self.run(HookStage::PreprocessCommand, |plugin| {
            plugin.preprocess_command(store, command)
        })
    }

    pub fn after_command(&self, store: &dyn StoreHandle, command: &str) -> Vec<PluginFailure> {
        self.run(HookStage::PostprocessCommand, |plugin| {
            plugin.postprocess_command(store, command)
        })
    }

    pub fn before_effect(
        &self,
        store: &dyn StoreHandle,
        effect: &EffectInfo<'_>,
    ) -> Vec<PluginFailure> {
        self.run(HookStage::PreprocessEffect, |plugin| {
            plugin.preprocess_effect(store, effect)
        })
    }

    /// Thread `output` through every plugin's `postprocess_effect`.
    pub fn after_effect(
        &self,
        store: &dyn StoreHandle,
        effect: &EffectInfo<'_>,
        output: &mut EffectOutput,
    ) -> Vec<PluginFailure> {
        self.run(HookStage::PostprocessEffect, |plugin| {
            plugin.postprocess_effect(store, effect, output)
        })
    }

    fn run(
        &self,
        stage: HookStage,
        mut hook: impl FnMut(&dyn StorePlugin) -> anyhow::Result<()>,
    ) -> Vec<PluginFailure> {
        let mut failures = Vec::new();
        for plugin in &self.plugins {
            if let Err(error) = hook(plugin.as_ref()) {
                warn!(plugin = plugin.name(), %stage, error = %error, "Plugin hook failed");
                failures.push(PluginFailure {
                    plugin: plugin.name().to_string(),
                    stage,
                    error,
                });
            }
        }
        failures
    }
}

impl fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginChain")
            .field("plugins", &self.names())
            .finish()
    }
}
