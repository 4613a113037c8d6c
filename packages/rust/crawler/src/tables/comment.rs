//! Locator for tables shipped inside an HTML comment.
//!
//! Some team tables are sent as `<!-- <table ...> ... </table> -->` inside a
//! `div#all_<table id>` placeholder and only revealed client-side. The parser
//! sees a comment node, not a table, so the markup has to be cut out of the
//! container's raw inner HTML and parsed again.

use npbstats_shared::{NpbStatsError, Result, StatType};
use scraper::Html;
use tracing::debug;

use super::{TableLocator, id_selector, table_selector};

const TABLE_OPEN: &str = "<table";
const TABLE_CLOSE: &str = "</table>";

/// Finds the table inside its `all_<id>` container, unwrapping a comment.
pub struct CommentWrappedLocator;

impl TableLocator for CommentWrappedLocator {
    fn locate(&self, doc: &Html, stat: StatType) -> Result<String> {
        let container_id = stat.container_id();
        let container_sel = id_selector("div", &container_id)?;
        let container = doc
            .select(&container_sel)
            .next()
            .ok_or_else(|| NpbStatsError::table_not_found(stat.table_id()))?;

        // The site occasionally serves the table uncommented.
        let table_sel = table_selector(stat.table_id())?;
        if let Some(table) = container.select(&table_sel).next() {
            debug!(container = %container_id, "table is live, no unwrapping needed");
            return Ok(table.html());
        }

        slice_table(&container.inner_html())
            .map(str::to_string)
            .ok_or_else(|| NpbStatsError::table_not_found(stat.table_id()))
    }

    fn name(&self) -> &str {
        "comment-wrapped"
    }
}

/// Cut from the first `<table` to the end of the last `</table>`.
fn slice_table(raw: &str) -> Option<&str> {
    let start = raw.find(TABLE_OPEN)?;
    let end = raw.rfind(TABLE_CLOSE)? + TABLE_CLOSE.len();
    (end > start).then(|| &raw[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::extract_table;

    const TABLE: &str = r#"<table id="team_pitching"><tbody>
        <tr><td data-stat="player">Sugano</td><td data-stat="era">3.12</td></tr>
        <tr class="spacer"></tr>
        <tr><td data-stat="player">Togo</td><td data-stat="era">3.69</td></tr>
    </tbody></table>"#;

    fn wrapped_page() -> String {
        format!(
            r#"<html><body><div id="all_team_pitching" class="table_wrapper">
                <div class="placeholder"></div>
                <!--
                {TABLE}
                -->
            </div></body></html>"#
        )
    }

    fn live_page() -> String {
        format!(r#"<html><body><div id="all_team_pitching">{TABLE}</div></body></html>"#)
    }

    #[test]
    fn test_slice_table_bounds() {
        let raw = "junk <table id=x><tr></tr></table> tail";
        assert_eq!(slice_table(raw), Some("<table id=x><tr></tr></table>"));
        assert_eq!(slice_table("no table here"), None);
        assert_eq!(slice_table("</table> then <table"), None);
    }

    #[test]
    fn test_unwraps_commented_table() {
        let table = extract_table(&wrapped_page(), StatType::Pitching).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("player"), Some("Togo"));
    }

    #[test]
    fn test_unwrapping_is_lossless() {
        let wrapped = extract_table(&wrapped_page(), StatType::Pitching).unwrap();
        let live = extract_table(&live_page(), StatType::Pitching).unwrap();
        assert_eq!(wrapped, live);
    }

    #[test]
    fn test_missing_container_is_table_not_found() {
        let page = format!("<html><body>{TABLE}</body></html>");
        let err = extract_table(&page, StatType::Pitching).unwrap_err();
        assert!(matches!(err, NpbStatsError::TableNotFound { .. }));
    }

    #[test]
    fn test_container_without_table_is_table_not_found() {
        let page = r#"<div id="all_team_pitching"><!-- nothing to see --></div>"#;
        let err = extract_table(page, StatType::Pitching).unwrap_err();
        assert_eq!(err.to_string(), "table not found for identifier team_pitching");
    }
}
