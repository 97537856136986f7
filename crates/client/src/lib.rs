//! Client code for cosmetic-filter.
//!
//! This crate provides the filter list fetch pipeline, element-hiding rule
//! parsing, the in-memory DOM the rules are applied to, and the per-page
//! orchestration that ties them together.

pub mod context;
pub mod dom;
pub mod fetch;
pub mod filters;

pub use context::{FilterContext, Freshness, InitOutcome, freshness};
pub use dom::{BlockReport, Blocker, Document, MutationObserver, MutationRecord, Page, SelectorWatcher};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, FilterSource, RemoteFilterList};
pub use filters::{parse_line, parse_selectors};
