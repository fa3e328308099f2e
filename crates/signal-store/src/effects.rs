//! # Effects and Queries
//!
//! - An **effect** is application code run against one store
//!   (`Store::run_effect`). It may ask to run inside the store's execution
//!   context so its body can resolve collaborators with [`crate::inject`].
//! - A **query** declares the collaborators it needs as its `Deps` type;
//!   `Store::run_query` resolves them through the execution context and
//!   passes them in.
//!
//! Effect results travel through the plugin chain as an [`EffectOutput`],
//! which plugins may inspect or replace before the caller receives it.

use crate::domain::StoreState;
use crate::ports::{resolve, ExecutionContext};
use crate::service::Store;
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Application code run against a store.
pub trait Effect<S: StoreState>: Send + Sync {
    type Args;
    type Output: Send + 'static;

    /// Name used in logs, errors and plugin hooks.
    fn name(&self) -> &str;

    /// Run inside the store's execution context (when one is configured).
    fn requires_context(&self) -> bool {
        false
    }

    fn run(&self, store: &Store<S>, args: Self::Args) -> anyhow::Result<Self::Output>;
}

/// What plugins learn about an effect invocation.
#[derive(Clone, Copy, Debug)]
pub struct EffectInfo<'a> {
    pub name: &'a str,
    pub requires_context: bool,
}

/// Effect built from a closure.
///
/// ```ignore
/// let load = EffectFn::new("load", |store: &Store<Cart>, id: u32| {
///     let api = inject::<CartApi>().context("CartApi not provided")?;
///     store.set(api.fetch(id)?);
///     Ok(())
/// })
/// .in_context();
/// ```
pub struct EffectFn<S, F, A, O> {
    name: String,
    requires_context: bool,
    func: F,
    _marker: PhantomData<fn(&S, A) -> O>,
}

impl<S, F, A, O> EffectFn<S, F, A, O>
where
    S: StoreState,
    F: Fn(&Store<S>, A) -> anyhow::Result<O> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            requires_context: false,
            func,
            _marker: PhantomData,
        }
    }

    /// Run this effect inside the store's execution context.
    pub fn in_context(mut self) -> Self {
        self.requires_context = true;
        self
    }
}

impl<S, F, A, O> Effect<S> for EffectFn<S, F, A, O>
where
    S: StoreState,
    F: Fn(&Store<S>, A) -> anyhow::Result<O> + Send + Sync,
    O: Send + 'static,
{
    type Args = A;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn requires_context(&self) -> bool {
        self.requires_context
    }

    fn run(&self, store: &Store<S>, args: A) -> anyhow::Result<O> {
        (self.func)(store, args)
    }
}

/// Type-erased effect result passed along the plugin chain.
pub struct EffectOutput(Box<dyn Any + Send>);

impl EffectOutput {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut::<T>()
    }

    /// Replace the result with `value` (of any type).
    pub fn replace<T: Any + Send>(&mut self, value: T) {
        self.0 = Box::new(value);
    }

    /// Transform a `T` result into a `U`. Leaves the output untouched and
    /// returns `false` if it is not a `T`.
    pub fn map<T: Any + Send, U: Any + Send>(&mut self, f: impl FnOnce(T) -> U) -> bool {
        let taken = std::mem::replace(&mut self.0, Box::new(()));
        match taken.downcast::<T>() {
            Ok(value) => {
                self.0 = Box::new(f(*value));
                true
            }
            Err(original) => {
                self.0 = original;
                false
            }
        }
    }

    /// Unwrap as `T`, handing the output back if it holds something else.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        self.0.downcast::<T>().map(|value| *value).map_err(Self)
    }
}

impl std::fmt::Debug for EffectOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EffectOutput(..)")
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Collaborators a query resolves through the execution context.
///
/// Implemented for `Arc<T>` and tuples of up to four `Arc`s.
pub trait Dependencies: Sized {
    /// Resolve every dependency, or name the first one that is missing.
    fn resolve_from(context: &dyn ExecutionContext) -> Result<Self, &'static str>;
}

impl Dependencies for () {
    fn resolve_from(_context: &dyn ExecutionContext) -> Result<Self, &'static str> {
        Ok(())
    }
}

impl<T: Any + Send + Sync> Dependencies for Arc<T> {
    fn resolve_from(context: &dyn ExecutionContext) -> Result<Self, &'static str> {
        resolve::<T>(context).ok_or(type_name::<T>())
    }
}

macro_rules! tuple_dependencies {
    ($($name:ident),+) => {
        impl<$($name: Dependencies),+> Dependencies for ($($name,)+) {
            fn resolve_from(context: &dyn ExecutionContext) -> Result<Self, &'static str> {
                Ok(($($name::resolve_from(context)?,)+))
            }
        }
    };
}

tuple_dependencies!(A);
tuple_dependencies!(A, B);
tuple_dependencies!(A, B, C);
tuple_dependencies!(A, B, C, D);

/// Function over resolved collaborators.
pub trait Query: Send + Sync {
    type Deps: Dependencies;
    type Args;
    type Output;

    fn name(&self) -> &str;

    fn query(&self, deps: Self::Deps, args: Self::Args) -> anyhow::Result<Self::Output>;
}

/// Query built from a closure.
///
/// ```ignore
/// let total = QueryFn::new("cart total", |(cart, prices): (Arc<Store<Cart>>, Arc<Store<Prices>>), ()| {
///     Ok(cart.state().total(&prices.state()))
/// });
/// ```
pub struct QueryFn<F, D, A, O> {
    name: String,
    func: F,
    _marker: PhantomData<fn(D, A) -> O>,
}

impl<F, D, A, O> QueryFn<F, D, A, O>
where
    F: Fn(D, A) -> anyhow::Result<O> + Send + Sync,
    D: Dependencies,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, D, A, O> Query for QueryFn<F, D, A, O>
where
    F: Fn(D, A) -> anyhow::Result<O> + Send + Sync,
    D: Dependencies,
{
    type Deps = D;
    type Args = A;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, deps: D, args: A) -> anyhow::Result<O> {
        (self.func)(deps, args)
    }
}
