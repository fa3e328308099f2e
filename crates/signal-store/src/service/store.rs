//! # Store (Orchestration Engine)
//!
//! Owns one state value and sequences every change through the optional
//! subsystems fixed at construction.
//!
//! ## Commit Order
//!
//! ```text
//! set / update / mutate / dispatch / undo / redo
//!   ┌ commit lock held ─────────────────────────────────────┐
//!   │ 1. history.add(previous, label)      (state history)  │
//!   │ 2. cell.swap(next)                                    │
//!   │ 3. persistence.save(name, next)      (local storage)  │
//!   │ 4. log_sink.log(name, label, [next]) (logging)        │
//!   └───────────────────────────────────────────────────────┘
//!   5. cell.notify(next)                   observers, lock released
//! ```
//!
//! Persistence and logging are best-effort: a failure there is logged and
//! never undoes step 2. A change made by an observer is therefore logged
//! after the change that triggered it.
//!
//! ## Reentrancy
//!
//! State changes on one store are serialized by a reentrant lock, so writes
//! reach storage in commit order. The lock covers only the update closure,
//! the storage backend and the log sink; observers, event handlers and
//! effects run without it and may change this or any other store from any
//! thread. Update closures must not change other stores.

use crate::domain::{
    Command, Feature, History, HistoryEntry, ResolvedConfig, StateCell, StoreState,
    UNSPECIFIED_COMMAND,
};
use crate::effects::{Dependencies, Effect, EffectInfo, EffectOutput, Query};
use crate::error::StoreError;
use crate::plugins::{PluginChain, PluginErrors, PluginFailure};
use crate::ports::{ExecutionContext, LogSink, StoreHandle};
use crate::service::builder::StoreBuilder;
use crate::service::persistence::PersistenceSynchronizer;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use shared_bus::{Event, EventMediator, RegistrationId};
use std::any::{type_name, Any};
use std::sync::Arc;
use tracing::{debug, warn};

/// Collaborators resolved by the builder.
pub(super) struct StoreParts<S> {
    pub config: ResolvedConfig,
    pub initial: S,
    pub history: Option<History<S>>,
    pub mediator: Option<Arc<EventMediator>>,
    pub context: Option<Arc<dyn ExecutionContext>>,
    pub persistence: Option<Arc<PersistenceSynchronizer>>,
    pub log_sink: Option<Arc<dyn LogSink>>,
    pub plugins: Arc<PluginChain>,
}

/// Reactive state container.
///
/// Built with [`Store::builder`]; shared as `Arc<Store<S>>`.
pub struct Store<S: StoreState> {
    config: ResolvedConfig,
    cell: StateCell<S>,
    commit_lock: ReentrantMutex<()>,
    history: Option<Mutex<History<S>>>,
    mediator: Option<Arc<EventMediator>>,
    context: Option<Arc<dyn ExecutionContext>>,
    persistence: Option<Arc<PersistenceSynchronizer>>,
    log_sink: Option<Arc<dyn LogSink>>,
    plugins: Arc<PluginChain>,
}

impl<S: StoreState> Store<S> {
    /// Start building a store holding `initial`.
    pub fn builder(initial: S) -> StoreBuilder<S> {
        StoreBuilder::new(initial)
    }

    pub(super) fn assemble(parts: StoreParts<S>) -> Self {
        Self {
            cell: StateCell::new(Arc::new(parts.initial)),
            commit_lock: ReentrantMutex::new(()),
            history: parts.history.map(Mutex::new),
            mediator: parts.mediator,
            context: parts.context,
            persistence: parts.persistence,
            log_sink: parts.log_sink,
            plugins: parts.plugins,
            config: parts.config,
        }
    }

    /// Write `state` to storage. Failures are reported, never propagated.
    fn persist(&self, state: &S) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(e) = persistence.save(self.name(), state) {
            warn!(store = %self.name(), error = %e, "Persisting state failed");
            if let Some(sink) = &self.log_sink {
                sink.log(self.name(), "persistence failed", &[Value::String(e.to_string())]);
            }
        }
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> Arc<S> {
        self.cell.get()
    }

    /// Project a value out of the current state.
    pub fn select<R>(&self, selector: impl FnOnce(&S) -> R) -> R {
        selector(&self.cell.get())
    }

    /// Call `observer` with the new state after every change.
    pub fn observe(&self, observer: impl Fn(&Arc<S>) + Send + Sync + 'static) {
        self.cell.observe(Arc::new(observer));
    }

    /// Number of state replacements since construction.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    // =========================================================================
    // STATE CHANGES
    // =========================================================================

    /// Replace the state, recorded as "unspecified command".
    pub fn set(&self, state: S) {
        self.set_named(state, UNSPECIFIED_COMMAND);
    }

    pub fn set_named(&self, state: S, command: &str) {
        self.commit(command, |_| Arc::new(state));
    }

    /// Replace the state with `f(current)`.
    ///
    /// `f` must build a new value; the current one is shared with history.
    pub fn update(&self, f: impl FnOnce(&S) -> S) {
        self.update_named(f, UNSPECIFIED_COMMAND);
    }

    pub fn update_named(&self, f: impl FnOnce(&S) -> S, command: &str) {
        self.commit(command, |current| Arc::new(f(current)));
    }

    /// Change the state in place on a private copy.
    ///
    /// Snapshots already in history are never touched.
    pub fn mutate(&self, f: impl FnOnce(&mut S)) {
        self.mutate_named(f, UNSPECIFIED_COMMAND);
    }

    pub fn mutate_named(&self, f: impl FnOnce(&mut S), command: &str) {
        self.commit(command, |current| {
            let mut working = current.clone();
            f(&mut working);
            Arc::new(working)
        });
    }

    /// Apply `command` as an update bracketed by the plugin command hooks.
    ///
    /// The state change happens even if a pre-hook fails.
    ///
    /// # Errors
    ///
    /// `StoreError::Plugins` with every failing hook, after both hook runs.
    pub fn dispatch<C: Command<S> + ?Sized>(&self, command: &C) -> Result<(), StoreError> {
        let label = command.name();

        let mut failures = self.plugins.before_command(self, label);
        self.update_named(|state| command.apply(state), label);
        failures.extend(self.plugins.after_command(self, label));

        into_result(failures)
    }

    fn commit(&self, command: &str, next: impl FnOnce(&S) -> Arc<S>) {
        let next = {
            let _guard = self.commit_lock.lock();

            let previous = self.cell.get();
            let next = next(&previous);

            if let Some(history) = &self.history {
                history.lock().add(previous, command);
            }
            self.cell.swap(Arc::clone(&next));
            self.persist(&next);

            debug!(store = %self.name(), command, version = self.cell.version(), "State changed");
            self.log_state(command, &next);
            next
        };

        self.cell.notify(&next);
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Restore the state before the last command.
    ///
    /// Returns `false` (and logs a notice) if history is disabled or empty.
    pub fn undo(&self) -> bool {
        self.step("undo", |history, current| history.undo(current))
    }

    /// Re-apply the last undone command.
    ///
    /// Returns `false` (and logs a notice) if history is disabled or there is
    /// nothing to redo.
    pub fn redo(&self) -> bool {
        self.step("redo", |history, current| history.redo(current))
    }

    fn step(
        &self,
        action: &str,
        apply: impl FnOnce(&mut History<S>, Arc<S>) -> Option<HistoryEntry<S>>,
    ) -> bool {
        let Some(history) = &self.history else {
            self.skip(action, "state history is not enabled");
            return false;
        };

        let state = {
            let _guard = self.commit_lock.lock();
            let entry = apply(&mut history.lock(), self.cell.get());

            let Some(entry) = entry else {
                self.skip(action, "history is empty");
                return false;
            };

            self.cell.swap(Arc::clone(&entry.state));
            self.persist(&entry.state);

            debug!(store = %self.name(), action, command = %entry.command, "History step applied");
            if let Some(sink) = &self.log_sink {
                sink.log(
                    self.name(),
                    action,
                    &[Value::String(entry.command), to_json(&*entry.state)],
                );
            }
            entry.state
        };

        self.cell.notify(&state);
        true
    }

    fn skip(&self, action: &str, reason: &str) {
        debug!(store = %self.name(), action, reason, "History step skipped");
        if let Some(sink) = &self.log_sink {
            sink.log(
                self.name(),
                &format!("{action} skipped"),
                &[Value::String(reason.to_string())],
            );
        }
    }

    /// Undo stack, oldest first. Empty when history is disabled.
    pub fn history(&self) -> Vec<HistoryEntry<S>> {
        self.history
            .as_ref()
            .map(|history| history.lock().entries())
            .unwrap_or_default()
    }

    /// Redo stack, next entry to redo last.
    pub fn redo_entries(&self) -> Vec<HistoryEntry<S>> {
        self.history
            .as_ref()
            .map(|history| history.lock().redo_entries())
            .unwrap_or_default()
    }

    pub fn can_undo(&self) -> bool {
        self.history
            .as_ref()
            .is_some_and(|history| history.lock().can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.history
            .as_ref()
            .is_some_and(|history| history.lock().can_redo())
    }

    /// Forget both stacks. The current state is kept.
    pub fn clear_history(&self) {
        if let Some(history) = &self.history {
            history.lock().clear();
        }
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Register `handler` for `E` on behalf of this store.
    ///
    /// With `with_replay`, every past publication is delivered to this
    /// store's handlers before returning.
    pub fn register_handler<E, F>(
        &self,
        handler: F,
        with_replay: bool,
    ) -> Result<RegistrationId, StoreError>
    where
        E: Event,
        F: Fn(&E, &E::Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mediator = self.mediator()?;
        let id = mediator.register::<E, F>(self.name(), handler);

        if with_replay {
            let replayed = mediator.replay(self.name())?;
            debug!(store = %self.name(), event = E::name(), replayed, "Backlog replayed");
        }
        Ok(id)
    }

    /// Publish `event` to every registered handler.
    ///
    /// Returns the source store of each handler that ran.
    pub fn publish<E: Event>(
        &self,
        event: E,
        payload: E::Payload,
    ) -> Result<Vec<String>, StoreError> {
        let mediator = self.mediator()?;
        let described = self.log_sink.as_ref().map(|_| format!("{payload:?}"));

        let handled = mediator.publish(event, payload)?;

        if let (Some(sink), Some(described)) = (&self.log_sink, described) {
            let action = format!("handled {}", E::name());
            for source in &handled {
                sink.log(source, &action, &[Value::String(described.clone())]);
            }
        }
        Ok(handled)
    }

    fn mediator(&self) -> Result<&Arc<EventMediator>, StoreError> {
        self.mediator
            .as_ref()
            .ok_or_else(|| self.disabled(Feature::Events))
    }

    // =========================================================================
    // EFFECTS & QUERIES
    // =========================================================================

    /// Run `effect` against this store, bracketed by the plugin effect hooks.
    ///
    /// Effects that require a context run inside this store's execution
    /// context, if one is configured.
    ///
    /// # Errors
    ///
    /// - `StoreError::Effect` if the effect body fails
    /// - `StoreError::Plugins` if any effect hook failed
    /// - `StoreError::OutputType` if a plugin changed the result's type
    pub fn run_effect<E: Effect<S>>(&self, effect: &E, args: E::Args) -> Result<E::Output, StoreError> {
        let info = EffectInfo {
            name: effect.name(),
            requires_context: effect.requires_context(),
        };

        let mut failures = self.plugins.before_effect(self, &info);

        let raw = match (&self.context, info.requires_context) {
            (Some(context), true) => self.run_in_context(context, effect, args),
            _ => effect.run(self, args),
        };
        let raw = raw.map_err(|error| StoreError::Effect {
            effect: info.name.to_string(),
            error,
        })?;

        let mut output = EffectOutput::new(raw);
        failures.extend(self.plugins.after_effect(self, &info, &mut output));
        into_result(failures)?;

        output
            .into_inner::<E::Output>()
            .map_err(|_| StoreError::OutputType {
                effect: info.name.to_string(),
                expected: type_name::<E::Output>(),
            })
    }

    fn run_in_context<E: Effect<S>>(
        &self,
        context: &Arc<dyn ExecutionContext>,
        effect: &E,
        args: E::Args,
    ) -> anyhow::Result<E::Output> {
        let mut args = Some(args);
        let mut result = None;

        Arc::clone(context).run_scoped(&mut || {
            if let Some(args) = args.take() {
                result = Some(effect.run(self, args));
            }
        });

        result.unwrap_or_else(|| {
            Err(anyhow::anyhow!(
                "execution context returned without running `{}`",
                effect.name()
            ))
        })
    }

    /// Resolve the dependencies `Q` declares, then run it.
    ///
    /// # Errors
    ///
    /// - `StoreError::FeatureDisabled` without effects and queries enabled
    /// - `StoreError::UnresolvedDependency` if a dependency is not provided
    /// - `StoreError::Query` if the query body fails
    pub fn run_query<Q: Query>(&self, query: &Q, args: Q::Args) -> Result<Q::Output, StoreError> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| self.disabled(Feature::EffectsAndQueries))?;

        let deps = Q::Deps::resolve_from(&**context).map_err(|dependency| {
            StoreError::UnresolvedDependency {
                store: self.name().to_string(),
                dependency,
            }
        })?;

        query.query(deps, args).map_err(|error| StoreError::Query {
            query: query.name().to_string(),
            error,
        })
    }

    /// The store's execution context, if effects and queries are enabled.
    pub fn context(&self) -> Option<&Arc<dyn ExecutionContext>> {
        self.context.as_ref()
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Remove the persisted entry for this store. The current state is kept.
    pub fn clear_persistence(&self) -> Result<(), StoreError> {
        let persistence = self
            .persistence
            .as_ref()
            .ok_or_else(|| self.disabled(Feature::LocalStorageSync))?;
        persistence.clear(self.name())?;
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    pub(super) fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    fn disabled(&self, feature: Feature) -> StoreError {
        StoreError::FeatureDisabled {
            store: self.name().to_string(),
            feature,
        }
    }

    fn log_state(&self, command: &str, state: &S) {
        if let Some(sink) = &self.log_sink {
            sink.log(self.name(), command, &[to_json(state)]);
        }
    }
}

impl<S: StoreState> StoreHandle for Store<S> {
    fn name(&self) -> &str {
        self.config.name()
    }

    fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    fn state_json(&self) -> Option<Value> {
        serde_json::to_value(&*self.cell.get()).ok()
    }

    fn history_len(&self) -> usize {
        self.history
            .as_ref()
            .map_or(0, |history| history.lock().len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<S: StoreState + std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name())
            .field("state", &self.cell.get())
            .field("features", &self.config.features())
            .field("plugins", &self.plugins.names())
            .finish()
    }
}

pub(super) fn into_result(failures: Vec<PluginFailure>) -> Result<(), StoreError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(PluginErrors::new(failures).into())
    }
}

fn to_json<S: StoreState>(state: &S) -> Value {
    serde_json::to_value(state).unwrap_or(Value::Null)
}

// =============================================================================
// TESTS
// =============================================================================
