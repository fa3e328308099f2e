//! # Plugin Chain
//!
//! One chain shared by several stores: precedence ordering, effect result
//! composition, and failure aggregation.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use signal_store::{
        CommandFn, Effect, EffectInfo, EffectOutput, HookStage, PluginRegistry, Store,
        StoreError, StoreHandle, StorePlugin,
    };
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Appends its tag to string effect results.
    struct Tagger {
        tag: &'static str,
        precedence: i32,
    }

    impl StorePlugin for Tagger {
        fn name(&self) -> &str {
            self.tag
        }

        fn precedence(&self) -> i32 {
            self.precedence
        }

        fn postprocess_effect(
            &self,
            _store: &dyn StoreHandle,
            _effect: &EffectInfo<'_>,
            output: &mut EffectOutput,
        ) -> anyhow::Result<()> {
            output.map(|result: String| format!("{}({result})", self.tag));
            Ok(())
        }
    }

    /// Records every hook it sees, per store.
    #[derive(Default)]
    struct Journal {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl StorePlugin for Journal {
        fn name(&self) -> &str {
            "journal"
        }

        fn init(&self, store: &dyn StoreHandle) -> anyhow::Result<()> {
            self.lines.lock().push(format!("init {}", store.name()));
            Ok(())
        }

        fn preprocess_command(&self, store: &dyn StoreHandle, command: &str) -> anyhow::Result<()> {
            self.lines
                .lock()
                .push(format!("before {command} on {} ({})", store.name(), store.history_len()));
            Ok(())
        }

        fn postprocess_command(&self, store: &dyn StoreHandle, command: &str) -> anyhow::Result<()> {
            self.lines
                .lock()
                .push(format!("after {command} on {} ({})", store.name(), store.history_len()));
            Ok(())
        }

        fn preprocess_effect(
            &self,
            store: &dyn StoreHandle,
            effect: &EffectInfo<'_>,
        ) -> anyhow::Result<()> {
            self.lines
                .lock()
                .push(format!("effect {} on {}", effect.name, store.name()));
            Ok(())
        }
    }

    /// Fails every hook it implements.
    struct Grumpy;

    impl StorePlugin for Grumpy {
        fn name(&self) -> &str {
            "grumpy"
        }

        fn precedence(&self) -> i32 {
            100
        }

        fn preprocess_effect(
            &self,
            _store: &dyn StoreHandle,
            _effect: &EffectInfo<'_>,
        ) -> anyhow::Result<()> {
            anyhow::bail!("not before")
        }

        fn postprocess_effect(
            &self,
            _store: &dyn StoreHandle,
            _effect: &EffectInfo<'_>,
            _output: &mut EffectOutput,
        ) -> anyhow::Result<()> {
            anyhow::bail!("not after")
        }
    }

    /// Greets whoever the store holds.
    struct Greet;

    impl Effect<String> for Greet {
        type Args = ();
        type Output = String;

        fn name(&self) -> &str {
            "greet"
        }

        fn run(&self, store: &Store<String>, _args: ()) -> anyhow::Result<String> {
            Ok(format!("hi {}", store.state()))
        }
    }

    // =============================================================================
    // INTEGRATION TESTS: ORDERING & COMPOSITION
    // =============================================================================

    #[test]
    fn test_postprocess_effect_is_p2_of_p1_of_raw() {
        let chain = PluginRegistry::new()
            .register(Tagger { tag: "p2", precedence: 5 })
            .register(Tagger { tag: "p1", precedence: 10 })
            .build();
        let store = Store::builder("ada".to_string()).plugins(chain).build().unwrap();

        let result = store.run_effect(&Greet, ()).unwrap();

        assert_eq!(result, "p2(p1(hi ada))");
    }

    #[test]
    fn test_chain_shared_by_many_stores() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginRegistry::new()
            .register(Journal {
                lines: Arc::clone(&lines),
            })
            .build();

        let a = Store::builder(0u32)
            .name("a")
            .with_history()
            .plugins(Arc::clone(&chain))
            .build()
            .unwrap();
        let b = Store::builder("x".to_string())
            .name("b")
            .plugins(Arc::clone(&chain))
            .build()
            .unwrap();

        a.dispatch(&CommandFn::new("inc", |n: &u32| n + 1)).unwrap();
        b.run_effect(&Greet, ()).unwrap();

        assert_eq!(
            *lines.lock(),
            vec![
                "init a",
                "init b",
                "before inc on a (0)",
                "after inc on a (1)",
                "effect greet on b",
            ]
        );
    }

    // =============================================================================
    // INTEGRATION TESTS: FAILURES
    // =============================================================================

    #[test]
    fn test_failing_plugin_does_not_block_the_rest() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginRegistry::new()
            .register(Journal {
                lines: Arc::clone(&lines),
            })
            .register(Grumpy)
            .register(Tagger { tag: "t", precedence: -1 })
            .build();
        let store = Store::builder("ada".to_string())
            .name("people")
            .plugins(chain)
            .build()
            .unwrap();
        lines.lock().clear();

        let err = store.run_effect(&Greet, ()).unwrap_err();

        let StoreError::Plugins(errors) = &err else {
            panic!("unexpected error: {err:?}");
        };
        let stages: Vec<_> = errors.failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![HookStage::PreprocessEffect, HookStage::PostprocessEffect]);
        assert_eq!(errors.plugins(), vec!["grumpy", "grumpy"]);
        assert_eq!(*lines.lock(), vec!["effect greet on people"]);
    }

    #[test]
    fn test_empty_chain_returns_raw_result() {
        let store = Store::builder("ada".to_string()).build().unwrap();

        assert_eq!(store.run_effect(&Greet, ()).unwrap(), "hi ada");
    }
}
