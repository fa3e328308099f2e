//! # Signal-Store Test Suite
//!
//! Integration tests that exercise several stores, the shared mediator and
//! real storage together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── counter_flow.rs        # history end to end
//!     ├── cross_store_events.rs  # publish / replay between stores
//!     ├── persistence_reload.rs  # reload simulation over file storage
//!     ├── plugin_chain.rs        # precedence and result composition
//!     └── effects_queries.rs     # scoped effects, dependent queries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p signal-store-tests
//! cargo test -p signal-store-tests integration::persistence_reload
//! ```

pub mod integration;
