//! Page fetching and statistics-table extraction.
//!
//! This crate provides:
//! - [`fetcher`]: Sequential HTTP fetcher with timeout and politeness jitter
//! - [`tables`]: Table-location strategies and the row walk that turns a
//!   `<table>` into a [`StatTable`](npbstats_shared::StatTable)

pub mod fetcher;
pub mod tables;

pub use fetcher::{FetchedPage, Fetcher, Politeness};
pub use tables::{
    CommentWrappedLocator, DirectLocator, LocatorRegistry, TableLocator, extract_table,
};
