//! Submission file stores.
//!
//! The orchestrator only sees the [`FileStore`] trait. [`LocalDirectoryStore`]
//! serves a directory that an upstream step has already decompressed.

mod error;
mod local;
mod store;

// === Error Types ===
pub use error::{Result, StoreError};

// === Stores ===
pub use local::LocalDirectoryStore;
pub use store::FileStore;
