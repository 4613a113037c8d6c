//! Table-location strategies and row extraction for team statistics pages.
//!
//! Finding the table and reading it are separate steps. A [`TableLocator`]
//! returns the markup of the `<table>` for a stat type, however the page
//! happens to embed it; [`extract_table`] then walks that table's body rows.

mod comment;
mod direct;

use std::sync::LazyLock;

use npbstats_shared::{NpbStatsError, Result, StatRow, StatTable, StatType};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub use comment::CommentWrappedLocator;
pub use direct::DirectLocator;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Strategy for finding a statistics table inside a team page.
pub trait TableLocator: Send + Sync {
    /// Return the outer markup of the table for `stat`.
    ///
    /// Fails with [`NpbStatsError::TableNotFound`] when the page lacks it.
    fn locate(&self, doc: &Html, stat: StatType) -> Result<String>;

    /// Human-readable locator name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps each stat type to the locator that understands its markup.
pub struct LocatorRegistry {
    locators: Vec<(StatType, Box<dyn TableLocator>)>,
}

impl LocatorRegistry {
    /// Batting tables sit directly in the page; pitching tables are shipped
    /// inside an HTML comment and revealed by script.
    pub fn new() -> Self {
        Self {
            locators: vec![
                (StatType::Batting, Box::new(DirectLocator)),
                (StatType::Pitching, Box::new(CommentWrappedLocator)),
            ],
        }
    }

    /// Replace the locator used for `stat`.
    pub fn with_locator(mut self, stat: StatType, locator: Box<dyn TableLocator>) -> Self {
        self.locators.retain(|(s, _)| *s != stat);
        self.locators.push((stat, locator));
        self
    }

    /// The locator registered for `stat`, or [`DirectLocator`] if none is.
    pub fn for_stat(&self, stat: StatType) -> &dyn TableLocator {
        self.locators
            .iter()
            .find(|(s, _)| *s == stat)
            .map(|(_, l)| l.as_ref())
            .unwrap_or(&DirectLocator)
    }
}

impl Default for LocatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

static TBODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody").expect("tbody selector"));
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("td selector"));

/// Extract the `stat` table from a team page using the default locators.
pub fn extract_table(page: &str, stat: StatType) -> Result<StatTable> {
    extract_table_with(&LocatorRegistry::new(), page, stat)
}

/// Extract the `stat` table from a team page using `registry`.
pub fn extract_table_with(
    registry: &LocatorRegistry,
    page: &str,
    stat: StatType,
) -> Result<StatTable> {
    let doc = Html::parse_document(page);
    let locator = registry.for_stat(stat);
    let markup = locator.locate(&doc, stat)?;
    debug!(table_id = stat.table_id(), locator = locator.name(), "table located");

    read_table_markup(&markup, stat.table_id())
}

/// Parse standalone table markup and read its body rows.
pub(crate) fn read_table_markup(markup: &str, table_id: &str) -> Result<StatTable> {
    let fragment = Html::parse_fragment(markup);
    let selector = table_selector(table_id)?;
    let table = fragment
        .select(&selector)
        .next()
        .ok_or_else(|| NpbStatsError::table_not_found(table_id))?;

    read_rows(table, table_id)
}

/// Walk every `tr` of the table's first `tbody`.
///
/// Rows without `td` cells are section separators and are skipped. Each
/// remaining `td` contributes its `data-stat` attribute as the key and its
/// trimmed text as the value.
fn read_rows(table: ElementRef<'_>, table_id: &str) -> Result<StatTable> {
    let tbody = table
        .select(&TBODY_SEL)
        .next()
        .ok_or_else(|| NpbStatsError::parse(format!("table {table_id} has no tbody")))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for tr in tbody.select(&TR_SEL) {
        let mut row = StatRow::new();
        let mut cell_count = 0usize;

        for td in tr.select(&TD_SEL) {
            cell_count += 1;
            let Some(key) = td.value().attr("data-stat") else {
                debug!(table_id, "cell without data-stat, skipping");
                continue;
            };
            let text = td.text().collect::<String>();
            row.insert(key, text.trim());
        }

        if cell_count == 0 {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(table_id, rows = rows.len(), skipped, "table rows read");
    Ok(StatTable::new(rows))
}

pub(crate) fn table_selector(table_id: &str) -> Result<Selector> {
    id_selector("table", table_id)
}

pub(crate) fn id_selector(tag: &str, id: &str) -> Result<Selector> {
    Selector::parse(&format!("{tag}#{id}"))
        .map_err(|e| NpbStatsError::parse(format!("invalid selector for id '{id}': {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATTING_PAGE: &str = r#"<html><body>
        <div id="all_team_batting">
          <table id="team_batting">
            <thead><tr><th data-stat="name">Name</th><th data-stat="hr">HR</th></tr></thead>
            <tbody>
              <tr><td data-stat="name">Ohtani</td><td data-stat="hr">34</td></tr>
              <tr class="thead"><th>Name</th><th>HR</th></tr>
              <tr><td data-stat="name"> Suzuki </td><td data-stat="hr">
                  12
              </td></tr>
            </tbody>
          </table>
        </div>
    </body></html>"#;

    #[test]
    fn test_row_becomes_stat_row() {
        let table = extract_table(BATTING_PAGE, StatType::Batting).unwrap();
        let expected: StatRow = [("name", "Ohtani"), ("hr", "34")].into_iter().collect();
        assert_eq!(table.rows[0], expected);
    }

    #[test]
    fn test_zero_cell_rows_are_skipped() {
        let table = extract_table(BATTING_PAGE, StatType::Batting).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|r| r.get("name") != Some("Name")));
    }

    #[test]
    fn test_cell_text_is_trimmed() {
        let table = extract_table(BATTING_PAGE, StatType::Batting).unwrap();
        assert_eq!(table.rows[1].get("name"), Some("Suzuki"));
        assert_eq!(table.rows[1].get("hr"), Some("12"));
    }

    #[test]
    fn test_missing_table_is_table_not_found() {
        let err = extract_table("<html><body><p>nothing</p></body></html>", StatType::Batting)
            .unwrap_err();
        assert!(matches!(err, NpbStatsError::TableNotFound { ref table_id } if table_id == "team_batting"));
    }

    #[test]
    fn test_cells_without_data_stat_are_ignored() {
        let page = r#"<table id="team_batting"><tbody>
            <tr><td data-stat="name">A</td><td>stray</td></tr>
        </tbody></table>"#;
        let table = extract_table(page, StatType::Batting).unwrap();
        assert_eq!(table.rows[0].len(), 1);
    }

    #[test]
    fn test_row_order_matches_document() {
        let page = r#"<table id="team_batting"><tbody>
            <tr><td data-stat="name">First</td></tr>
            <tr><td data-stat="name">Second</td></tr>
            <tr><td data-stat="name">Third</td></tr>
        </tbody></table>"#;
        let table = extract_table(page, StatType::Batting).unwrap();
        let names: Vec<_> = table.rows.iter().filter_map(|r| r.get("name")).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    struct FixedLocator;

    impl TableLocator for FixedLocator {
        fn locate(&self, _doc: &Html, _stat: StatType) -> Result<String> {
            Ok(r#"<table id="team_pitching"><tbody><tr><td data-stat="w">9</td></tr></tbody></table>"#.into())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_registry_locator_can_be_replaced() {
        let registry = LocatorRegistry::new().with_locator(StatType::Pitching, Box::new(FixedLocator));
        assert_eq!(registry.for_stat(StatType::Pitching).name(), "fixed");
        assert_eq!(registry.for_stat(StatType::Batting).name(), "direct");

        let table = extract_table_with(&registry, "<html></html>", StatType::Pitching).unwrap();
        assert_eq!(table.rows[0].get("w"), Some("9"));
    }
}
