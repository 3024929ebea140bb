//! WallStore - keyed local persistence for WhisperWall
//!
//! Device-local storage addressed by logical key names, in the spirit of a
//! browser's local storage: each key holds one JSON document. Nothing here is
//! shared across devices, and there is no locking; callers access the store
//! sequentially from a single owner.
//!
//! # Modules
//!
//! - [`store`] - the [`LocalStore`] trait and typed [`StoreExt`] helpers
//! - [`file`] - directory-backed store, one file per key
//! - [`memory`] - in-process store for tests and ephemeral sessions
//! - [`error`] - [`StoreError`]

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{CURRENT_VERSION, Envelope, LocalStore, StoreExt, validate_key};

/// Directory name used under the platform data directory
pub const APP_DIR_NAME: &str = "whisperwall";
