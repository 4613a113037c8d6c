//! Locator for tables present in the live document.

use npbstats_shared::{NpbStatsError, Result, StatType};
use scraper::Html;

use super::{TableLocator, table_selector};

/// Finds `table#<id>` directly in the parsed page.
pub struct DirectLocator;

impl TableLocator for DirectLocator {
    fn locate(&self, doc: &Html, stat: StatType) -> Result<String> {
        let selector = table_selector(stat.table_id())?;
        doc.select(&selector)
            .next()
            .map(|table| table.html())
            .ok_or_else(|| NpbStatsError::table_not_found(stat.table_id()))
    }

    fn name(&self) -> &str {
        "direct"
    }
}
