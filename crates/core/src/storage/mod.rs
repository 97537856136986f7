//! SQLite-backed page storage for the selector cache.
//!
//! This module provides a persistent key/value store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Web Storage style `get_item` / `set_item` / `remove_item`
//! - Schema versioning through `PRAGMA user_version`
//! - WAL mode for concurrent access
//! - The two-key selector cache record used by the orchestrator

pub mod connection;
pub mod items;
pub mod record;

pub use crate::Error;

pub use connection::{LocalStorage, SCHEMA_VERSION};
pub use record::{CacheRecord, LAST_UPDATE_KEY, STORAGE_KEY, SelectorCache};
