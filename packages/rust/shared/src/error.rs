//! Error types for npbstats.
//!
//! Library crates use [`NpbStatsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all npbstats operations.
#[derive(Debug, thiserror::Error)]
pub enum NpbStatsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure: DNS, connect, timeout, body read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Expected markup element or attribute is absent.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// No hyperlink on the league index carries the league name.
    #[error("league not found: no link with text '{league}'")]
    LeagueNotFound { league: String },

    /// A year marker used to bracket the team list is missing or misplaced.
    #[error("marker not found: {marker}")]
    MarkerNotFound { marker: String },

    /// The requested statistics table (or its container) is absent.
    #[error("table not found for identifier {table_id}")]
    TableNotFound { table_id: String },

    /// The table exists but has no data rows.
    #[error("no rows extracted from table {table_id}")]
    EmptyTable { table_id: String },

    /// Delimited file could not be read or written.
    #[error("csv error at {path:?}: {message}")]
    Csv { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing inputs, inconsistent config, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NpbStatsError>;

impl NpbStatsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a marker-not-found error.
    pub fn marker(msg: impl Into<String>) -> Self {
        Self::MarkerNotFound { marker: msg.into() }
    }

    /// Create a table-not-found error for the given table identifier.
    pub fn table_not_found(table_id: impl Into<String>) -> Self {
        Self::TableNotFound {
            table_id: table_id.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a CSV failure with the file it concerns.
    pub fn csv(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Csv {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NpbStatsError::config("base_url is not a valid URL");
        assert_eq!(err.to_string(), "config error: base_url is not a valid URL");

        let err = NpbStatsError::table_not_found("team_pitching");
        assert_eq!(
            err.to_string(),
            "table not found for identifier team_pitching"
        );
    }

    #[test]
    fn http_status_is_distinct_from_transport() {
        let err = NpbStatsError::HttpStatus {
            url: "https://example.com/register/".into(),
            status: 503,
        };
        assert!(err.to_string().starts_with("HTTP 503"));
        assert!(!matches!(err, NpbStatsError::Network(_)));
    }

    #[test]
    fn league_not_found_names_the_league() {
        let err = NpbStatsError::LeagueNotFound {
            league: "Japan Western League".into(),
        };
        assert!(err.to_string().contains("Japan Western League"));
    }
}
