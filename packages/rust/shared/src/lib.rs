//! Shared types, error model, and configuration for npbstats.
//!
//! This crate is the foundation depended on by all other npbstats crates.
//! It provides:
//! - [`NpbStatsError`]: the unified error type
//! - Domain types ([`StatType`], [`StatRow`], [`StatTable`], [`TeamDirectory`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, LeagueConfig, OutputConfig, RunConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{NpbStatsError, Result};
pub use types::{StatRow, StatTable, StatType, TeamDirectory, TeamLink, normalize_team_name};
