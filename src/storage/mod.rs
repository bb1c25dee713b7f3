//! Citizen storage subsystem
//!
//! The import and update logic talks to storage only through
//! [`CitizenStore`]. Two backends implement it:
//!
//! - [`MemoryStore`]: process-local, lost on restart
//! - [`FileStore`]: one JSON document per import on disk
//!
//! # Guarantees
//!
//! - `write_batch` makes a whole import visible at once
//! - each call is atomic on its own; no call spans another
//! - `delete_import` on an absent import succeeds (rollback is always safe)

mod config;
mod errors;
mod file;
mod memory;
mod store;

pub use config::{BackendKind, StorageConfig};
pub use errors::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::CitizenStore;
