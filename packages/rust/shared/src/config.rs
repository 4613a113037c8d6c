//! Application configuration for npbstats.
//!
//! User config lives at `~/.npbstats/npbstats.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{NpbStatsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "npbstats.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".npbstats";

/// Desktop browser user agent; the source site throttles obvious bots harder.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching npbstats.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the statistics come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client and politeness settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Leagues to scrape, in processing order.
    #[serde(default = "default_leagues")]
    pub leagues: Vec<LeagueConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
            leagues: default_leagues(),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site origin; scraped hrefs are resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the league index ("standings index") page.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Season to scrape.
    #[serde(default = "default_year")]
    pub year: u32,

    /// Competition token used in the combined file name.
    #[serde(default = "default_competition")]
    pub competition: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_path: default_index_path(),
            year: default_year(),
            competition: default_competition(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.baseball-reference.com".into()
}
fn default_index_path() -> String {
    "/register/".into()
}
fn default_year() -> u32 {
    2022
}
fn default_competition() -> String {
    "npb".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound of the random pause between requests, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_delay_ms: default_max_delay_ms(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_delay_ms() -> u64 {
    3000
}
fn default_max_redirects() -> usize {
    5
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory under which all dataset files are written.
    #[serde(default = "default_output_root")]
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

fn default_output_root() -> String {
    "resources".into()
}

/// `[[leagues]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Exact visible text of the league link on the index page.
    pub name: String,
    /// Directory and file-name token, e.g. `central`.
    pub slug: String,
}

impl LeagueConfig {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
        }
    }
}

fn default_leagues() -> Vec<LeagueConfig> {
    vec![
        LeagueConfig::new("Japan Pacific League", "pacific"),
        LeagueConfig::new("Japan Central League", "central"),
    ]
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Validated runtime configuration handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Parsed site origin.
    pub base_url: Url,
    /// League index path, relative to `base_url`.
    pub index_path: String,
    /// Season to scrape.
    pub year: u32,
    /// Competition token for the combined files.
    pub competition: String,
    /// Leagues in processing order.
    pub leagues: Vec<LeagueConfig>,
    /// HTTP client settings.
    pub fetch: FetchConfig,
    /// Root directory for dataset files.
    pub output_root: PathBuf,
}

impl TryFrom<&AppConfig> for RunConfig {
    type Error = NpbStatsError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.source.base_url).map_err(|e| {
            NpbStatsError::config(format!(
                "invalid base_url '{}': {e}",
                config.source.base_url
            ))
        })?;

        let run = Self {
            base_url,
            index_path: config.source.index_path.clone(),
            year: config.source.year,
            competition: config.source.competition.clone(),
            leagues: config.leagues.clone(),
            fetch: config.fetch.clone(),
            output_root: PathBuf::from(&config.output.root),
        };
        run.validate()?;
        Ok(run)
    }
}

impl RunConfig {
    /// Absolute URL of the league index page.
    pub fn index_url(&self) -> Result<Url> {
        self.base_url.join(&self.index_path).map_err(|e| {
            NpbStatsError::config(format!("invalid index_path '{}': {e}", self.index_path))
        })
    }

    /// League slugs in processing order.
    pub fn league_slugs(&self) -> Vec<String> {
        self.leagues.iter().map(|l| l.slug.clone()).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.leagues.is_empty() {
            return Err(NpbStatsError::config("at least one league must be configured"));
        }

        let mut seen = HashSet::new();
        for league in &self.leagues {
            if league.slug.trim().is_empty() || league.name.trim().is_empty() {
                return Err(NpbStatsError::config(
                    "league name and slug must not be empty",
                ));
            }
            if !seen.insert(league.slug.as_str()) {
                return Err(NpbStatsError::config(format!(
                    "duplicate league slug '{}'",
                    league.slug
                )));
            }
        }

        // The team list is bracketed by `year` and `year - 1`.
        if self.year < 2 {
            return Err(NpbStatsError::config(format!("invalid year {}", self.year)));
        }

        if self.competition.trim().is_empty() {
            return Err(NpbStatsError::config("competition must not be empty"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.npbstats/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NpbStatsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.npbstats/npbstats.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NpbStatsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NpbStatsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NpbStatsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NpbStatsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NpbStatsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
