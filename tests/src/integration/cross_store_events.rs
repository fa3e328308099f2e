//! # Cross-Store Events
//!
//! Stores wired to one mediator notify each other without references to
//! one another. Every test builds its own mediator so the process-wide one
//! stays untouched.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use shared_bus::{Event, EventMediator};
    use signal_store::{MemoryLogSink, Store, StoreError};
    use std::sync::{Arc, Weak};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    #[derive(Debug)]
    struct ItemAdded;

    impl Event for ItemAdded {
        type Payload = String;
    }

    #[derive(Debug)]
    struct CartCleared;

    impl Event for CartCleared {
        type Payload = ();
    }

    fn store(name: &str, mediator: &Arc<EventMediator>) -> Arc<Store<Vec<String>>> {
        Store::builder(Vec::new())
            .name(name)
            .with_events(Arc::clone(mediator))
            .build()
            .unwrap()
    }

    /// Make `store` append every added item to its own state.
    fn mirror_items(store: &Arc<Store<Vec<String>>>, with_replay: bool) {
        let weak: Weak<Store<Vec<String>>> = Arc::downgrade(store);
        store
            .register_handler(
                move |_: &ItemAdded, item: &String| {
                    if let Some(store) = weak.upgrade() {
                        let item = item.clone();
                        store.mutate_named(|items| items.push(item), "mirror");
                    }
                    Ok(())
                },
                with_replay,
            )
            .unwrap();
    }

    // =============================================================================
    // INTEGRATION TESTS: PUBLISH
    // =============================================================================

    #[test]
    fn test_publish_fans_out_in_registration_order() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        let audit = store("audit", &mediator);
        let badge = store("badge", &mediator);
        mirror_items(&audit, false);
        mirror_items(&badge, false);

        let handled = cart.publish(ItemAdded, "apple".into()).unwrap();

        assert_eq!(handled, vec!["audit", "badge"]);
        assert_eq!(*audit.state(), vec!["apple"]);
        assert_eq!(*badge.state(), vec!["apple"]);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_publish_with_no_handlers_returns_empty() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);

        assert!(cart.publish(CartCleared, ()).unwrap().is_empty());
        assert_eq!(mediator.ledger_len::<CartCleared>(), 1);
    }

    #[test]
    fn test_handled_entries_attributed_to_handler_source() {
        let mediator = Arc::new(EventMediator::new());
        let sink = Arc::new(MemoryLogSink::new());
        let cart = Store::builder(Vec::<String>::new())
            .name("cart")
            .with_events(Arc::clone(&mediator))
            .with_logging(Arc::clone(&sink))
            .build()
            .unwrap();
        let audit = store("audit", &mediator);
        mirror_items(&audit, false);

        cart.publish(ItemAdded, "pear".into()).unwrap();

        let entry = &sink.entries()[0];
        assert_eq!(entry.context, "audit");
        assert_eq!(entry.action, "handled ItemAdded");
        assert_eq!(entry.data, vec![serde_json::json!("\"pear\"")]);
    }

    #[test]
    fn test_reentrant_publish_from_handler() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        let cleared = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&cart);
        cart.register_handler(
            move |_: &ItemAdded, item: &String| {
                if item == "clear-all" {
                    if let Some(cart) = weak.upgrade() {
                        cart.publish(CartCleared, ())?;
                    }
                }
                Ok(())
            },
            false,
        )
        .unwrap();
        let counter = Arc::clone(&cleared);
        cart.register_handler(
            move |_: &CartCleared, _: &()| {
                *counter.lock() += 1;
                Ok(())
            },
            false,
        )
        .unwrap();

        cart.publish(ItemAdded, "clear-all".into()).unwrap();

        assert_eq!(*cleared.lock(), 1);
        assert_eq!(mediator.ledger_len::<ItemAdded>(), 1);
        assert_eq!(mediator.ledger_len::<CartCleared>(), 1);
    }

    #[test]
    fn test_failing_handler_surfaces_to_publisher() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        let strict = store("strict", &mediator);
        strict
            .register_handler(
                |_: &ItemAdded, item: &String| {
                    anyhow::ensure!(!item.is_empty(), "empty item");
                    Ok(())
                },
                false,
            )
            .unwrap();

        let err = cart.publish(ItemAdded, String::new()).unwrap_err();

        match err {
            StoreError::Mediator(inner) => assert_eq!(inner.subscriber(), "strict"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mediator.registration_count::<ItemAdded>(), 1);
    }

    // =============================================================================
    // INTEGRATION TESTS: REPLAY
    // =============================================================================

    #[test]
    fn test_late_store_catches_up_with_replay() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        for item in ["a", "b", "c"] {
            cart.publish(ItemAdded, item.to_string()).unwrap();
        }

        let late = store("late", &mediator);
        mirror_items(&late, true);

        assert_eq!(*late.state(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_registration_without_replay_ignores_backlog() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        cart.publish(ItemAdded, "old".into()).unwrap();

        let fresh = store("fresh", &mediator);
        mirror_items(&fresh, false);
        cart.publish(ItemAdded, "new".into()).unwrap();

        assert_eq!(*fresh.state(), vec!["new"]);
    }

    #[test]
    fn test_replay_repeats_for_each_handler_of_the_source() {
        let mediator = Arc::new(EventMediator::new());
        let cart = store("cart", &mediator);
        cart.publish(ItemAdded, "x".into()).unwrap();

        let late = store("late", &mediator);
        let calls = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let calls = Arc::clone(&calls);
            late.register_handler(
                move |_: &ItemAdded, item: &String| {
                    calls.lock().push(format!("{tag}:{item}"));
                    Ok(())
                },
                true,
            )
            .unwrap();
        }

        // The second registration's replay covers both handlers of "late".
        assert_eq!(*calls.lock(), vec!["first:x", "first:x", "second:x"]);
    }
}
