//! Core domain types for scraped statistics tables.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

// ---------------------------------------------------------------------------
// StatType
// ---------------------------------------------------------------------------

/// The two kinds of team table scraped from each team page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    Batting,
    Pitching,
}

impl StatType {
    /// Both stat types, in processing order.
    pub const ALL: [StatType; 2] = [StatType::Batting, StatType::Pitching];

    /// The `id` attribute of the table on the team page; also used in file names.
    pub fn table_id(self) -> &'static str {
        match self {
            StatType::Batting => "team_batting",
            StatType::Pitching => "team_pitching",
        }
    }

    /// The `id` of the wrapper `div` that holds the table.
    pub fn container_id(self) -> String {
        format!("all_{}", self.table_id())
    }
}

impl std::fmt::Display for StatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_id())
    }
}

// ---------------------------------------------------------------------------
// StatRow / StatTable
// ---------------------------------------------------------------------------

/// One table row: column key → cell text, in column order.
///
/// Values are kept exactly as scraped; no numeric coercion happens anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatRow {
    cells: Vec<(String, String)>,
}

impl StatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StatRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = StatRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Ordered rows of one scraped (or merged) table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatTable {
    pub rows: Vec<StatRow>,
}

impl StatTable {
    pub fn new(rows: Vec<StatRow>) -> Self {
        Self { rows }
    }

    /// Union of all row keys, ordered by first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Set `key` to `value` on every row.
    pub fn tag(&mut self, key: &str, value: &str) {
        for row in &mut self.rows {
            row.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TeamDirectory
// ---------------------------------------------------------------------------

/// A team's display name and its page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLink {
    pub name: String,
    pub url: Url,
}

/// Team display name → team page URL for one league and season.
///
/// Iteration follows document order. Inserting a name that is already
/// present replaces its URL in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamDirectory {
    teams: Vec<TeamLink>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, url: Url) {
        let name = name.into();
        match self.teams.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.url = url,
            None => self.teams.push(TeamLink { name, url }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Url> {
        self.teams.iter().find(|t| t.name == name).map(|t| &t.url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamLink> {
        self.teams.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Team name normalization
// ---------------------------------------------------------------------------

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Turn a team display name into a file-name fragment.
///
/// Lower-cases and joins words with a single underscore, so differently
/// capitalized or spaced mentions of one team land in the same file.
pub fn normalize_team_name(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(name.trim(), "_")
        .to_lowercase()
}
