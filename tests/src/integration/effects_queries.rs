//! # Effects and Queries
//!
//! Effects resolving collaborators from the current scope, and queries
//! combining several stores provided through one injector.

#[cfg(test)]
mod tests {
    use signal_store::{
        in_context, inject, EffectFn, Injector, QueryFn, Store, StoreError,
    };
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Stand-in for a remote catalogue.
    struct Catalogue {
        prices: Vec<(&'static str, u32)>,
    }

    impl Catalogue {
        fn price(&self, item: &str) -> Option<u32> {
            self.prices
                .iter()
                .find(|(name, _)| *name == item)
                .map(|(_, price)| *price)
        }
    }

    struct Discount(u32);

    fn catalogue() -> Arc<Catalogue> {
        Arc::new(Catalogue {
            prices: vec![("apple", 3), ("pear", 4)],
        })
    }

    // =============================================================================
    // INTEGRATION TESTS: EFFECTS
    // =============================================================================

    #[test]
    fn test_effect_loads_through_injected_service() {
        let injector = Arc::new(Injector::new());
        injector.provide(catalogue());
        let cart = Store::builder(Vec::<u32>::new())
            .name("cart")
            .with_history()
            .with_effects(Arc::clone(&injector))
            .build()
            .unwrap();

        let add = EffectFn::new("add item", |cart: &Store<Vec<u32>>, item: &'static str| {
            let catalogue = inject::<Catalogue>()
                .ok_or_else(|| anyhow::anyhow!("catalogue not provided"))?;
            let price = catalogue
                .price(item)
                .ok_or_else(|| anyhow::anyhow!("unknown item {item}"))?;
            cart.mutate_named(|prices| prices.push(price), "add item");
            Ok(price)
        })
        .in_context();

        assert_eq!(cart.run_effect(&add, "apple").unwrap(), 3);
        assert_eq!(cart.run_effect(&add, "pear").unwrap(), 4);
        assert_eq!(*cart.state(), vec![3, 4]);

        let err = cart.run_effect(&add, "kiwi").unwrap_err();
        assert!(matches!(err, StoreError::Effect { .. }));
        assert_eq!(cart.history().len(), 2);
        assert!(!in_context());
    }

    #[test]
    fn test_scope_is_left_after_failing_effect() {
        let injector = Arc::new(Injector::new());
        let store = Store::builder(0u32).with_effects(injector).build().unwrap();
        let fails = EffectFn::new("fails", |_: &Store<u32>, ()| -> anyhow::Result<()> {
            anyhow::ensure!(!in_context(), "inside a scope");
            Ok(())
        })
        .in_context();

        assert!(store.run_effect(&fails, ()).is_err());
        assert!(!in_context());
    }

    #[test]
    fn test_child_injector_overrides_parent() {
        let parent = Arc::new(Injector::new());
        parent.provide(Arc::new(Discount(0))).provide(catalogue());
        let child = Arc::new(Injector::child(Arc::clone(&parent)));
        child.provide(Arc::new(Discount(1)));
        let store = Store::builder(0u32).with_effects(child).build().unwrap();

        let priced = EffectFn::new("priced", |_: &Store<u32>, item: &'static str| {
            let price = inject::<Catalogue>().and_then(|c| c.price(item)).unwrap_or(0);
            let discount = inject::<Discount>().map_or(0, |d| d.0);
            Ok(price - discount)
        })
        .in_context();

        assert_eq!(store.run_effect(&priced, "pear").unwrap(), 3);
    }

    // =============================================================================
    // INTEGRATION TESTS: QUERIES
    // =============================================================================

    #[test]
    fn test_query_over_two_stores() {
        let quantities = Store::builder(vec![2u32, 1]).name("quantities").build().unwrap();
        let prices = Store::builder(vec![3u32, 4]).name("prices").build().unwrap();
        let injector = Arc::new(Injector::new());
        injector
            .provide(Arc::clone(&quantities))
            .provide(Arc::new(Discount(2)));
        let checkout = Store::builder(0u32)
            .name("checkout")
            .with_effects(injector)
            .build()
            .unwrap();

        // Stores of the same type share one slot, so prices travel as an argument.
        let total = QueryFn::new(
            "total",
            |(quantities, discount): (Arc<Store<Vec<u32>>>, Arc<Discount>),
             prices: Arc<Store<Vec<u32>>>| {
                let sum: u32 = quantities
                    .state()
                    .iter()
                    .zip(prices.state().iter())
                    .map(|(q, p)| q * p)
                    .sum();
                Ok(sum - discount.0)
            },
        );

        let value = checkout.run_query(&total, Arc::clone(&prices)).unwrap();
        checkout.set(value);

        assert_eq!(*checkout.state(), 8);
    }

    #[test]
    fn test_query_reports_missing_dependency() {
        let checkout = Store::builder(0u32)
            .name("checkout")
            .with_effects(Arc::new(Injector::new()))
            .build()
            .unwrap();
        let query = QueryFn::new("discounted", |discount: Arc<Discount>, base: u32| {
            Ok(base - discount.0)
        });

        let err = checkout.run_query(&query, 10).unwrap_err();

        match err {
            StoreError::UnresolvedDependency { store, dependency } => {
                assert_eq!(store, "checkout");
                assert!(dependency.ends_with("Discount"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_query_requires_effects_feature() {
        let plain = Store::builder(0u32).build().unwrap();
        let query = QueryFn::new("noop", |(): (), ()| Ok(()));

        assert!(matches!(
            plain.run_query(&query, ()),
            Err(StoreError::FeatureDisabled { .. })
        ));
    }
}
