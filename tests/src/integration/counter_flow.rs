//! # Counter Flow
//!
//! A history-enabled counter driven through updates, commands, undo and
//! redo, with every change reported to a log sink.

#[cfg(test)]
mod tests {
    use signal_store::{CommandFn, MemoryLogSink, Store, StoreConfig, StoreBuilder};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn counter(sink: &Arc<MemoryLogSink>) -> Arc<Store<i64>> {
        Store::builder(0)
            .name("counter")
            .with_history()
            .with_logging(Arc::clone(sink))
            .build()
            .unwrap()
    }

    fn labels(store: &Store<i64>) -> Vec<String> {
        store.history().into_iter().map(|entry| entry.command).collect()
    }

    // =============================================================================
    // INTEGRATION TESTS: UNDO / REDO
    // =============================================================================

    #[test]
    fn test_three_increments_two_undos_one_redo() {
        let sink = Arc::new(MemoryLogSink::new());
        let store = counter(&sink);

        for _ in 0..3 {
            store.update_named(|n| n + 1, "inc");
        }
        assert_eq!(*store.state(), 3);
        assert_eq!(labels(&store), vec!["inc", "inc", "inc"]);

        store.undo();
        store.undo();
        assert_eq!(*store.state(), 1);

        store.redo();
        assert_eq!(*store.state(), 2);

        assert_eq!(
            sink.actions_for("counter"),
            vec!["inc", "inc", "inc", "undo", "undo", "redo"]
        );
    }

    #[test]
    fn test_undo_n_times_is_lifo() {
        let sink = Arc::new(MemoryLogSink::new());
        let store = counter(&sink);
        let values = [5, -2, 40, 7, 0, 13];

        for value in values {
            store.set(value);
        }
        for expected in values.iter().rev().skip(1) {
            assert!(store.undo());
            assert_eq!(*store.state(), *expected);
        }
        assert!(store.undo());
        assert_eq!(*store.state(), 0);
        assert!(!store.undo());
    }

    #[test]
    fn test_new_change_after_undo_discards_redo() {
        let sink = Arc::new(MemoryLogSink::new());
        let store = counter(&sink);
        store.update_named(|n| n + 1, "inc");
        store.update_named(|n| n + 1, "inc");

        store.undo();
        store.set(100);

        assert!(!store.redo());
        assert_eq!(*store.state(), 100);
        assert_eq!(sink.actions_for("counter").last().map(String::as_str), Some("redo skipped"));
    }

    #[test]
    fn test_commands_and_raw_changes_share_history() {
        let sink = Arc::new(MemoryLogSink::new());
        let store = counter(&sink);
        let double = CommandFn::new("double", |n: &i64| n * 2);

        store.set(3);
        store.dispatch(&double).unwrap();
        store.mutate_named(|n| *n -= 1, "dec");

        assert_eq!(*store.state(), 5);
        assert_eq!(labels(&store), vec!["unspecified command", "double", "dec"]);

        store.undo();
        store.undo();
        assert_eq!(*store.state(), 3);
    }

    #[test]
    fn test_env_style_config_without_history() {
        let config = StoreConfig {
            name: Some("quiet".into()),
            ..StoreConfig::default()
        };
        let store = StoreBuilder::from_config(config, 1i64).build().unwrap();

        store.set(2);

        assert!(!store.undo());
        assert_eq!(*store.state(), 2);
        assert!(store.history().is_empty());
    }
    // =============================================================================
    // INTEGRATION TESTS: DEFAULT LOGGING
    // =============================================================================

    #[test]
    fn test_default_sink_logs_through_tracing() {
        let telemetry = store_telemetry::TelemetryConfig {
            console_output: false,
            ..store_telemetry::TelemetryConfig::default()
        };
        // Another test may already have installed the subscriber.
        let _ = store_telemetry::init_logging(&telemetry);

        let config = StoreConfig {
            name: Some("traced".into()),
            enable_logging: true,
            enable_state_history: true,
            ..StoreConfig::default()
        };
        let store = StoreBuilder::from_config(config, 0i64).build().unwrap();

        store.update_named(|n| n + 1, "inc");
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(*store.state(), 0);
    }
}
