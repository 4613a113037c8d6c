//! League- and competition-level merging of dataset files.

use std::path::PathBuf;

use npbstats_shared::{NpbStatsError, Result, StatType};
use tracing::{debug, info, instrument};

use crate::dataset::{concat_tables, read_table, write_table};
use crate::{DatasetLayout, LEAGUE_COLUMN};

/// Outcome of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    /// File written.
    pub path: PathBuf,
    /// Input files, in merge order.
    pub inputs: Vec<PathBuf>,
    /// Rows written.
    pub rows: usize,
}

/// Merge every per-team `stat` file of `league` into the league file.
///
/// Inputs are the files in the league directory ending in `_{table_id}.csv`,
/// minus the league file itself. See [`aggregate_league_files`].
#[instrument(skip_all, fields(league = %league, stat = %stat))]
pub fn aggregate_league(
    layout: &DatasetLayout,
    league: &str,
    stat: StatType,
) -> Result<AggregateSummary> {
    let dir = layout.league_dir(league);
    let output = layout.league_file(league, stat);
    let suffix = format!("_{}.csv", stat.table_id());

    let entries = std::fs::read_dir(&dir).map_err(|e| NpbStatsError::io(&dir, e))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| NpbStatsError::io(&dir, e))?;
        let path = entry.path();
        let is_team_file = path.is_file()
            && path != output
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix));
        if is_team_file {
            inputs.push(path);
        }
    }

    aggregate_league_files(layout, league, stat, inputs)
}

/// Merge the given per-team `stat` files of `league` into the league file.
///
/// Inputs are read in file-name order and each row is tagged with the league
/// slug. No inputs is a [`NpbStatsError::Validation`] error.
#[instrument(skip_all, fields(league = %league, stat = %stat, files = inputs.len()))]
pub fn aggregate_league_files(
    layout: &DatasetLayout,
    league: &str,
    stat: StatType,
    mut inputs: Vec<PathBuf>,
) -> Result<AggregateSummary> {
    inputs.sort();

    if inputs.is_empty() {
        return Err(NpbStatsError::validation(format!(
            "no {} team files for league {league}",
            stat.table_id()
        )));
    }

    let mut tables = Vec::with_capacity(inputs.len());
    for path in &inputs {
        debug!(path = %path.display(), "reading team file");
        tables.push(read_table(path)?);
    }

    let output = layout.league_file(league, stat);
    let mut merged = concat_tables(tables);
    merged.tag(LEAGUE_COLUMN, league);
    let rows = write_table(&merged, &output, &[])?;

    info!(files = inputs.len(), rows, path = %output.display(), "league aggregate written");
    Ok(AggregateSummary {
        path: output,
        inputs,
        rows,
    })
}

/// Merge the league files of `leagues` (in the given order) into the
/// competition-wide file.
#[instrument(skip_all, fields(competition = %competition, stat = %stat))]
pub fn aggregate_competition(
    layout: &DatasetLayout,
    competition: &str,
    leagues: &[String],
    stat: StatType,
) -> Result<AggregateSummary> {
    if leagues.is_empty() {
        return Err(NpbStatsError::validation("no leagues to aggregate"));
    }

    let inputs: Vec<PathBuf> = leagues
        .iter()
        .map(|league| layout.league_file(league, stat))
        .collect();

    let mut tables = Vec::with_capacity(inputs.len());
    for path in &inputs {
        tables.push(read_table(path)?);
    }

    let merged = concat_tables(tables);
    let output = layout.competition_file(competition, stat);
    let rows = write_table(&merged, &output, &[])?;

    info!(files = inputs.len(), rows, path = %output.display(), "competition aggregate written");
    Ok(AggregateSummary {
        path: output,
        inputs,
        rows,
    })
}
