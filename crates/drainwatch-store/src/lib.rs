//! Drainwatch Store - Persistence ports and adapters
//!
//! Read access goes through [`ports::DrainageCatalog`]; every mutation runs
//! inside a [`ports::UnitOfWork`] that commits or rolls back as a whole.

pub mod file_store;
pub mod memory;
pub mod ports;
pub mod postgres;

pub use file_store::LocalFileStore;
pub use memory::{MemoryStore, Seed};
pub use ports::{DrainageCatalog, Store, Transaction, Transactional, UnitOfWork};
