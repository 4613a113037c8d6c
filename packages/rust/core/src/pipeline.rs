//! End-to-end scrape pipeline: league index → league pages → team pages →
//! per-team CSV files → league and competition aggregates.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use npbstats_crawler::{Fetcher, extract_table};
use npbstats_discovery::{ResolvedLeague, discover_teams, resolve_leagues};
use npbstats_shared::{
    NpbStatsError, Result, RunConfig, StatType, TeamDirectory, TeamLink, normalize_team_name,
};
use npbstats_storage::{
    AggregateSummary, DatasetLayout, TEAM_COLUMN, aggregate_competition, aggregate_league,
    aggregate_league_files, write_table,
};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a team page is fetched.
    fn team_started(&self, league: &str, team: &str, current: usize, total: usize);
    /// Called after a dataset file is written.
    fn table_written(&self, path: &Path, rows: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn team_started(&self, _league: &str, _team: &str, _current: usize, _total: usize) {}
    fn table_written(&self, _path: &Path, _rows: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A unit of work that failed without stopping the run.
#[derive(Debug)]
pub struct UnitFailure {
    /// What was being processed, e.g. `central/Hanshin Tigers/team_batting`.
    pub scope: String,
    pub error: NpbStatsError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.error)
    }
}

/// Outcome of a run or an aggregate rebuild.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Team pages requested.
    pub teams_attempted: usize,
    /// Per-team files written.
    pub tables_written: usize,
    /// Data rows across all per-team files.
    pub rows_written: usize,
    /// League and competition files written, in write order.
    pub aggregates: Vec<AggregateSummary>,
    pub failures: Vec<UnitFailure>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            teams_attempted: 0,
            tables_written: 0,
            rows_written: 0,
            aggregates: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// `true` when every unit of work succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, scope: impl Into<String>, error: NpbStatsError) {
        let scope = scope.into();
        warn!(%scope, error = %error, "unit failed, continuing");
        self.failures.push(UnitFailure { scope, error });
    }
}

/// A per-team file written during the current run.
struct WrittenTable {
    league: String,
    stat: StatType,
    path: PathBuf,
}

/// A resolved league together with its team directory for the season.
#[derive(Debug, Clone)]
pub struct LeagueTeams {
    pub league: ResolvedLeague,
    pub teams: TeamDirectory,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run the full scrape pipeline.
///
/// 1. Resolve every configured league on the league index
/// 2. Collect each league's team links for the season
/// 3. Fetch each team page once and write its batting and pitching tables
/// 4. Merge the files written in step 3 into league and competition files
///
/// Discovery failures and output directory errors abort the run. A failing
/// team page, table or aggregate is recorded in [`RunSummary::failures`]
/// and the run moves on.
#[instrument(skip_all, fields(year = config.year, competition = %config.competition))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::new();

    info!(
        leagues = config.leagues.len(),
        out = %config.output_root.display(),
        "starting scrape"
    );

    let fetcher = Fetcher::new(&config.fetch)?;

    // --- Phase 1: Discovery ---
    progress.phase("Discovering leagues and teams");
    let directories = discover_with(&fetcher, config).await?;

    // --- Phase 2: Output layout ---
    progress.phase("Preparing output directories");
    let layout = DatasetLayout::new(&config.output_root);
    layout.prepare(config.leagues.iter().map(|l| l.slug.as_str()))?;

    // --- Phase 3: Team tables ---
    progress.phase("Scraping team tables");
    let mut written = Vec::new();
    for entry in &directories {
        scrape_league(&fetcher, &layout, entry, &mut written, &mut summary, progress).await;
    }

    // --- Phase 4: Aggregation ---
    // Only this run's files: a failed team's file from an earlier run stays out.
    progress.phase("Aggregating");
    aggregate_all(&layout, config, Some(written.as_slice()), &mut summary);

    summary.elapsed = start.elapsed();
    info!(
        teams = summary.teams_attempted,
        tables = summary.tables_written,
        rows = summary.rows_written,
        failures = summary.failures.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "scrape finished"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Rebuild the league and competition files from per-team files already on
/// disk, without touching the network.
#[instrument(skip_all, fields(competition = %config.competition))]
pub fn rebuild_aggregates(config: &RunConfig, progress: &dyn ProgressReporter) -> RunSummary {
    let start = Instant::now();
    let mut summary = RunSummary::new();

    progress.phase("Aggregating");
    let layout = DatasetLayout::new(&config.output_root);
    aggregate_all(&layout, config, None, &mut summary);

    summary.elapsed = start.elapsed();
    progress.done(&summary);
    summary
}

/// Resolve every configured league and its team directory, without
/// scraping any team page.
pub async fn discover(config: &RunConfig) -> Result<Vec<LeagueTeams>> {
    let fetcher = Fetcher::new(&config.fetch)?;
    discover_with(&fetcher, config).await
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

async fn discover_with(fetcher: &Fetcher, config: &RunConfig) -> Result<Vec<LeagueTeams>> {
    let index_url = config.index_url()?;
    let leagues = resolve_leagues(fetcher, &config.base_url, &index_url, &config.leagues).await?;

    let mut directories = Vec::with_capacity(leagues.len());
    for league in leagues {
        let teams = discover_teams(fetcher, &config.base_url, &league.url, config.year).await?;
        if teams.is_empty() {
            warn!(league = %league.league.slug, "no teams found between year markers");
        }
        directories.push(LeagueTeams { league, teams });
    }

    Ok(directories)
}

#[instrument(skip_all, fields(league = %entry.league.league.slug))]
async fn scrape_league(
    fetcher: &Fetcher,
    layout: &DatasetLayout,
    entry: &LeagueTeams,
    written: &mut Vec<WrittenTable>,
    summary: &mut RunSummary,
    progress: &dyn ProgressReporter,
) {
    let slug = entry.league.league.slug.as_str();
    let total = entry.teams.len();

    for (i, team) in entry.teams.iter().enumerate() {
        progress.team_started(slug, &team.name, i + 1, total);
        summary.teams_attempted += 1;

        let page = match fetcher.fetch(&team.url).await {
            Ok(page) => page,
            Err(e) => {
                summary.fail(format!("{slug}/{}", team.name), e);
                continue;
            }
        };

        for stat in StatType::ALL {
            match write_team_table(layout, slug, team, &page.body, stat) {
                Ok((path, rows)) => {
                    summary.tables_written += 1;
                    summary.rows_written += rows;
                    progress.table_written(&path, rows);
                    written.push(WrittenTable {
                        league: slug.to_string(),
                        stat,
                        path,
                    });
                }
                Err(e) => summary.fail(format!("{slug}/{}/{}", team.name, stat.table_id()), e),
            }
        }
    }
}

/// Extract one table from a team page and write it to the team's file.
fn write_team_table(
    layout: &DatasetLayout,
    league: &str,
    team: &TeamLink,
    body: &str,
    stat: StatType,
) -> Result<(PathBuf, usize)> {
    let table = extract_table(body, stat)?;
    if table.is_empty() {
        return Err(NpbStatsError::EmptyTable {
            table_id: stat.table_id().to_string(),
        });
    }

    let path = layout.team_file(league, &team.name, stat);
    let tag = normalize_team_name(&team.name);
    let rows = write_table(&table, &path, &[(TEAM_COLUMN, tag.as_str())])?;
    info!(team = %team.name, stat = %stat, rows, "team table written");
    Ok((path, rows))
}

/// Build every league file, then every competition file.
///
/// With `written`, league files merge exactly those per-team files; without
/// it, every per-team file found in the league directory.
fn aggregate_all(
    layout: &DatasetLayout,
    config: &RunConfig,
    written: Option<&[WrittenTable]>,
    summary: &mut RunSummary,
) {
    for league in &config.leagues {
        for stat in StatType::ALL {
            let result = match written {
                Some(written) => {
                    let inputs = written
                        .iter()
                        .filter(|w| w.league == league.slug && w.stat == stat)
                        .map(|w| w.path.clone())
                        .collect();
                    aggregate_league_files(layout, &league.slug, stat, inputs)
                }
                None => aggregate_league(layout, &league.slug, stat),
            };
            match result {
                Ok(agg) => summary.aggregates.push(agg),
                Err(e) => summary.fail(format!("{}/{}", league.slug, stat.table_id()), e),
            }
        }
    }

    let slugs = config.league_slugs();
    for stat in StatType::ALL {
        match aggregate_competition(layout, &config.competition, &slugs, stat) {
            Ok(agg) => summary.aggregates.push(agg),
            Err(e) => summary.fail(format!("{}/{}", config.competition, stat.table_id()), e),
        }
    }
}
