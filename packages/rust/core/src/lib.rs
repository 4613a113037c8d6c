//! Run orchestration for npbstats.
//!
//! This crate ties together league discovery, team page scraping, dataset
//! writing and aggregation into the end-to-end workflows the CLI exposes.

pub mod pipeline;
