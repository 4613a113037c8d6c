//! Flat-file dataset storage.
//!
//! Every table npbstats produces is a CSV file under one output root, and a
//! file's identity is its path:
//!
//! - `{root}/{league}/{team}_{stat}.csv`: one team's table
//! - `{root}/{league}/{league}_{stat}.csv`: all teams of a league
//! - `{root}/{competition}_all_{stat}.csv`: all leagues
//!
//! Files are overwritten on every run; there is no append mode.

mod aggregate;
mod dataset;

use std::path::PathBuf;

use npbstats_shared::{NpbStatsError, Result, StatType, normalize_team_name};
use tracing::debug;

pub use aggregate::{
    AggregateSummary, aggregate_competition, aggregate_league, aggregate_league_files,
};
pub use dataset::{concat_tables, read_table, write_table};

/// Column injected into per-team files.
pub const TEAM_COLUMN: &str = "team";

/// Column injected by league aggregation.
pub const LEAGUE_COLUMN: &str = "league";

/// Path convention for all dataset files under one output root.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn league_dir(&self, league: &str) -> PathBuf {
        self.root.join(league)
    }

    /// Per-team file. The team name is normalized, so differently
    /// capitalized spellings of one team share a file.
    pub fn team_file(&self, league: &str, team: &str, stat: StatType) -> PathBuf {
        self.league_dir(league).join(format!(
            "{}_{}.csv",
            normalize_team_name(team),
            stat.table_id()
        ))
    }

    pub fn league_file(&self, league: &str, stat: StatType) -> PathBuf {
        self.league_dir(league)
            .join(format!("{league}_{}.csv", stat.table_id()))
    }

    pub fn competition_file(&self, competition: &str, stat: StatType) -> PathBuf {
        self.root
            .join(format!("{competition}_all_{}.csv", stat.table_id()))
    }

    /// Create the root and one directory per league.
    pub fn prepare<'a>(&self, leagues: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for league in leagues {
            let dir = self.league_dir(league);
            std::fs::create_dir_all(&dir).map_err(|e| NpbStatsError::io(&dir, e))?;
            debug!(dir = %dir.display(), "league directory ready");
        }
        std::fs::create_dir_all(&self.root).map_err(|e| NpbStatsError::io(&self.root, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = DatasetLayout::new("resources");
        assert_eq!(
            layout.team_file("central", "Yomiuri Giants", StatType::Batting),
            PathBuf::from("resources/central/yomiuri_giants_team_batting.csv")
        );
        assert_eq!(
            layout.league_file("pacific", StatType::Pitching),
            PathBuf::from("resources/pacific/pacific_team_pitching.csv")
        );
        assert_eq!(
            layout.competition_file("npb", StatType::Batting),
            PathBuf::from("resources/npb_all_team_batting.csv")
        );
    }

    #[test]
    fn test_team_file_collides_for_same_team() {
        let layout = DatasetLayout::new("out");
        assert_eq!(
            layout.team_file("central", "Tokyo Giants", StatType::Batting),
            layout.team_file("central", "tokyo  giants", StatType::Batting)
        );
    }

    #[test]
    fn test_prepare_creates_league_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(tmp.path().join("resources"));
        layout.prepare(["central", "pacific"]).unwrap();
        assert!(layout.league_dir("central").is_dir());
        assert!(layout.league_dir("pacific").is_dir());
    }
}
