//! Store construction.
//!
//! The builder resolves configuration once and fills in default
//! collaborators for features that were enabled without one:
//!
//! | Feature                | Default                      |
//! |------------------------|------------------------------|
//! | events                 | `EventMediator::global()`    |
//! | effects and queries    | fresh `Injector`             |
//! | logging                | `TracingLogSink`             |
//! | local storage sync     | none; `build()` fails        |

use crate::adapters::{Injector, TracingLogSink};
use crate::domain::{Feature, History, StoreConfig, StoreState};
use crate::error::StoreError;
use crate::plugins::PluginChain;
use crate::ports::{ExecutionContext, LogSink, StorageBackend};
use crate::service::persistence::PersistenceSynchronizer;
use crate::service::store::{into_result, Store, StoreParts};
use shared_bus::EventMediator;
use std::sync::Arc;
use tracing::info;

/// Builder for [`Store`].
pub struct StoreBuilder<S: StoreState> {
    initial: S,
    config: StoreConfig,
    mediator: Option<Arc<EventMediator>>,
    context: Option<Arc<dyn ExecutionContext>>,
    log_sink: Option<Arc<dyn LogSink>>,
    storage: Option<Arc<dyn StorageBackend>>,
    plugins: Option<Arc<PluginChain>>,
}

impl<S: StoreState> StoreBuilder<S> {
    pub fn new(initial: S) -> Self {
        Self::from_config(StoreConfig::default(), initial)
    }

    /// Start from a configuration record, e.g. one deserialized from a file.
    pub fn from_config(config: StoreConfig, initial: S) -> Self {
        Self {
            initial,
            config,
            mediator: None,
            context: None,
            log_sink: None,
            storage: None,
            plugins: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Record undo/redo history.
    pub fn with_history(mut self) -> Self {
        self.config.enable_state_history = true;
        self
    }

    /// Record undo/redo history, keeping at most `limit` entries.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.config.enable_state_history = true;
        self.config.history_limit = Some(limit);
        self
    }

    /// Take part in events through `mediator`.
    pub fn with_events(mut self, mediator: Arc<EventMediator>) -> Self {
        self.config.enable_events = true;
        self.mediator = Some(mediator);
        self
    }

    /// Take part in events through the process-wide mediator.
    pub fn with_global_events(mut self) -> Self {
        self.config.enable_events = true;
        self.mediator = None;
        self
    }

    /// Run effects and queries against `context`.
    pub fn with_effects<C: ExecutionContext + 'static>(mut self, context: Arc<C>) -> Self {
        self.config.enable_effects_and_queries = true;
        self.context = Some(context);
        self
    }

    /// Send store activity to `sink`.
    pub fn with_logging<L: LogSink + 'static>(mut self, sink: Arc<L>) -> Self {
        self.config.enable_logging = true;
        self.log_sink = Some(sink);
        self
    }

    /// Load from and save to `backend` under the store name.
    pub fn with_persistence<B: StorageBackend + 'static>(mut self, backend: Arc<B>) -> Self {
        self.config.enable_local_storage_sync = true;
        self.storage = Some(backend);
        self
    }

    /// Share `chain` with this store.
    pub fn plugins(mut self, chain: Arc<PluginChain>) -> Self {
        self.plugins = Some(chain);
        self
    }

    /// Resolve configuration, restore persisted state and run plugin init hooks.
    ///
    /// # Errors
    ///
    /// - `StoreError::Misconfigured` if local storage sync has no backend
    /// - `StoreError::Plugins` if an init hook failed
    pub fn build(self) -> Result<Arc<Store<S>>, StoreError> {
        let config = self.config.resolve::<S>();
        let name = config.name().to_string();

        let persistence = match (config.is_enabled(Feature::LocalStorageSync), self.storage) {
            (true, Some(backend)) => Some(Arc::new(PersistenceSynchronizer::new(backend))),
            (true, None) => {
                return Err(StoreError::Misconfigured {
                    store: name,
                    reason: "local storage sync is enabled without a storage backend".into(),
                })
            }
            (false, _) => None,
        };

        let initial = persistence
            .as_ref()
            .and_then(|persistence| persistence.load::<S>(&name))
            .unwrap_or(self.initial);

        let mediator = config
            .is_enabled(Feature::Events)
            .then(|| self.mediator.unwrap_or_else(EventMediator::global));

        let context = config.is_enabled(Feature::EffectsAndQueries).then(|| {
            self.context
                .unwrap_or_else(|| Arc::new(Injector::new()) as Arc<dyn ExecutionContext>)
        });

        let log_sink = config.is_enabled(Feature::Logging).then(|| {
            self.log_sink
                .unwrap_or_else(|| Arc::new(TracingLogSink) as Arc<dyn LogSink>)
        });

        let history = config
            .is_enabled(Feature::StateHistory)
            .then(|| History::with_limit(config.history_limit()));

        let store = Arc::new(Store::assemble(StoreParts {
            history,
            initial,
            mediator,
            context,
            persistence,
            log_sink,
            plugins: self.plugins.unwrap_or_else(PluginChain::empty),
            config,
        }));

        into_result(store.plugins().run_init(&*store))?;

        info!(
            store = %store.name(),
            features = ?store.config().features(),
            plugins = store.plugins().len(),
            "Store created"
        );
        Ok(store)
    }
}

impl<S: StoreState + Default> Default for StoreBuilder<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
