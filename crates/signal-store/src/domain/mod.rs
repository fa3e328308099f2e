//! Domain layer: configuration, history, state cell, commands.
//!
//! Pure data structures; no I/O and no knowledge of collaborators.

pub mod command;
pub mod config;
pub mod history;
pub mod state;

pub use command::{Command, CommandFn};
pub use config::{Feature, ResolvedConfig, StoreConfig, ENV_HISTORY, ENV_LOGGING};
pub use history::{History, HistoryEntry, UNSPECIFIED_COMMAND};
pub use state::{Observer, StateCell, StoreState};
