//! # Injector
//!
//! Type-keyed singleton registry implementing the `ExecutionContext` port.
//!
//! While a context is running a callback (`run` / `run_scoped`) it is the
//! thread's *current* context, and [`inject`] resolves services from it.
//! Scopes nest: the innermost context wins, and leaving a scope (even by
//! unwinding) restores the outer one.

use crate::ports::{resolve, ExecutionContext};
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

thread_local! {
    static CURRENT: RefCell<Vec<Arc<dyn ExecutionContext>>> = const { RefCell::new(Vec::new()) };
}

/// Resolve `T` from the thread's current execution context.
///
/// Returns `None` outside any scope or if `T` was never provided.
pub fn inject<T: Any + Send + Sync>() -> Option<Arc<T>> {
    let current = CURRENT.with(|stack| stack.borrow().last().cloned())?;
    resolve::<T>(current.as_ref())
}

/// True while some execution context is installed on this thread.
pub fn in_context() -> bool {
    CURRENT.with(|stack| !stack.borrow().is_empty())
}

/// RAII guard installing a context as the thread's current one.
///
/// Custom `ExecutionContext` implementations use this in `run_scoped`.
pub struct ContextScope {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ContextScope {
    pub fn enter(context: Arc<dyn ExecutionContext>) -> Self {
        CURRENT.with(|stack| stack.borrow_mut().push(context));
        Self {
            _not_send: std::marker::PhantomData,
        }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Singleton registry, optionally chained to a parent.
#[derive(Default)]
pub struct Injector {
    services: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    parent: Option<Arc<Injector>>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injector that falls back to `parent` for services it does not provide.
    pub fn child(parent: Arc<Injector>) -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            parent: Some(parent),
        }
    }

    /// Register `service` as the singleton for `T`, replacing any previous one.
    pub fn provide<T: Any + Send + Sync>(&self, service: Arc<T>) -> &Self {
        trace!(service = type_name::<T>(), "Service provided");
        self.services.write().insert(TypeId::of::<T>(), service);
        self
    }

    /// Singleton for `T`, looking through parents.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        resolve::<T>(self)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.resolve_any(TypeId::of::<T>()).is_some()
    }

    /// Run `f` with this injector as the current context.
    pub fn run<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        let context: Arc<dyn ExecutionContext> = self.clone();
        let _scope = ContextScope::enter(context);
        f()
    }
}

impl ExecutionContext for Injector {
    fn run_scoped(self: Arc<Self>, f: &mut dyn FnMut()) {
        let _scope = ContextScope::enter(self);
        f();
    }

    fn resolve_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        let local = self.services.read().get(&type_id).cloned();
        local.or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.resolve_any(type_id))
        })
    }
}
