//! # Commands
//!
//! A command is a named, pure state transition. Dispatching a command is the
//! one kind of state change that passes through the plugin chain's command
//! hooks; raw `set`/`update`/`mutate` calls do not.

/// Named state transition.
pub trait Command<S>: Send + Sync {
    /// Label recorded in history and passed to plugin hooks.
    fn name(&self) -> &str;

    /// Compute the next state. Must not depend on anything but `state`.
    fn apply(&self, state: &S) -> S;
}

/// Command built from a closure.
///
/// ```ignore
/// let increment = CommandFn::new("increment", |count: &u32| count + 1);
/// store.dispatch(&increment)?;
/// ```
pub struct CommandFn<F> {
    name: String,
    apply: F,
}

impl<F> CommandFn<F> {
    pub fn new(name: impl Into<String>, apply: F) -> Self {
        Self {
            name: name.into(),
            apply,
        }
    }
}

impl<S, F> Command<S> for CommandFn<F>
where
    F: Fn(&S) -> S + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, state: &S) -> S {
        (self.apply)(state)
    }
}
