//! Incremental page loading for the `listwindow` engine.
//!
//! The `listwindow` crate decides which rows to draw and when the viewport nears the end of the
//! loaded content. This crate decides when to fetch more:
//!
//! - [`Pager`]: a headless state machine that owns the accumulated list and hands out page
//!   requests, at most one at a time per subject, discarding results that resolve after the
//!   subject changed.
//! - [`Feed`]: an async driver that runs a `Pager` against a [`PageSource`].
//! - [`SentinelTrigger`]: debouncing for an end-of-list visibility sentinel.
//! - [`SearchHistory`]: recent searches over an injectable [`KeyValueStore`].
//!
//! Failures are classified into [`FetchError`] by the data source; the feed surfaces them and
//! never advances its page state on failure.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod feed;
mod history;
mod options;
mod pager;
mod source;
mod trigger;

#[cfg(test)]
mod tests;

pub use error::{FetchError, StoreError};
pub use feed::Feed;
pub use history::{
    DEFAULT_HISTORY_LIMIT, HISTORY_KEY, KeyValueStore, MemoryStore, SearchHistory,
};
pub use options::{DEFAULT_PAGE_SIZE, FeedOptions};
pub use pager::{FeedSnapshot, FetchState, PageOutcome, PageTicket, Pager, SkipReason};
pub use source::{Identified, Page, PageSource};
pub use trigger::{LoadTrigger, SentinelTrigger};
