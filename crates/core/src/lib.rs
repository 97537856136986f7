//! Core types and shared functionality for cosmetic-filter.
//!
//! This crate provides:
//! - Page-scoped key/value storage with a SQLite backend
//! - The selector cache record stored in it
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod selectors;
pub mod storage;

pub use config::{AppConfig, UrlError, filter_list_url};
pub use error::Error;
pub use selectors::SelectorSet;
pub use storage::{CacheRecord, LocalStorage, SelectorCache};
