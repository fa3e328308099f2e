//! Application services: the store itself, its builder and the
//! persistence synchronizer it drives.

pub mod builder;
pub mod persistence;
pub mod store;

pub use builder::StoreBuilder;
pub use persistence::PersistenceSynchronizer;
pub use store::Store;
