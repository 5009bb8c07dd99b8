//! Embedded data store for Vellum documents.
//!
//! The store is the opaque collaborator that a document carries inside its
//! payload. Vellum only needs two things from it: keyed rows grouped into
//! named tables (the commit chain lives in one of them), and a way to turn
//! the whole store into bytes and back.
//!
//! # Design Rules
//!
//! 1. The store never interprets row values -- it is a pure key-value store.
//! 2. `export` is a consistent snapshot; `import` replaces everything or nothing.
//! 3. Inserting an existing key through [`DataStore::insert`] is a no-op.
//! 4. All decode errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDataStore;
pub use snapshot::{STORE_FORMAT_VERSION, STORE_MAGIC};
pub use traits::DataStore;
