//! Reading and writing single dataset files.

use std::fs::File;
use std::path::Path;

use npbstats_shared::{NpbStatsError, Result, StatRow, StatTable};
use tracing::debug;

/// Write `table` to `path` as CSV, replacing any existing file.
///
/// The header is the union of the rows' keys in first-seen order, followed
/// by any `tags` column not already present. Every row gets each tag's
/// value; a key missing from a row is written as an empty field.
///
/// Returns the number of data rows written.
pub fn write_table(table: &StatTable, path: &Path, tags: &[(&str, &str)]) -> Result<usize> {
    let mut columns = table.columns();
    for (key, _) in tags {
        if !columns.iter().any(|c| c == *key) {
            columns.push((*key).to_string());
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| NpbStatsError::csv(path, e))?;

    if !columns.is_empty() {
        writer
            .write_record(&columns)
            .map_err(|e| NpbStatsError::csv(path, e))?;
    }

    for row in &table.rows {
        let record = columns.iter().map(|col| {
            tags.iter()
                .find(|(k, _)| *k == col.as_str())
                .map(|(_, v)| *v)
                .or_else(|| row.get(col))
                .unwrap_or("")
        });
        writer
            .write_record(record)
            .map_err(|e| NpbStatsError::csv(path, e))?;
    }

    writer.flush().map_err(|e| NpbStatsError::io(path, e))?;

    debug!(path = %path.display(), rows = table.len(), columns = columns.len(), "dataset written");
    Ok(table.len())
}

/// Read a CSV file written by [`write_table`] back into a table.
///
/// Every field stays a string; empty fields become empty values.
pub fn read_table(path: &Path) -> Result<StatTable> {
    let file = File::open(path).map_err(|e| NpbStatsError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| NpbStatsError::csv(path, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| NpbStatsError::csv(path, e))?;
        let row: StatRow = headers.iter().zip(record.iter()).collect();
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "dataset read");
    Ok(StatTable::new(rows))
}

/// Concatenate tables in order, widening to the union of their columns.
///
/// Mismatched column sets never fail: a row lacking a column gets an empty
/// value for it.
pub fn concat_tables(tables: impl IntoIterator<Item = StatTable>) -> StatTable {
    let mut merged = StatTable::new(
        tables
            .into_iter()
            .flat_map(|t| t.rows)
            .collect(),
    );

    let columns = merged.columns();
    for row in &mut merged.rows {
        for col in &columns {
            if row.get(col).is_none() {
                row.insert(col.as_str(), "");
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> StatRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_write_then_read_with_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("giants_team_batting.csv");

        let table = StatTable::new(vec![
            row(&[("player", "Okamoto"), ("HR", "30")]),
            row(&[("player", "Maru"), ("HR", "27")]),
        ]);
        let written = write_table(&table, &path, &[("team", "yomiuri_giants")]).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "player,HR,team\nOkamoto,30,yomiuri_giants\nMaru,27,yomiuri_giants\n"
        );

        let back = read_table(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.rows[1].get("team"), Some("yomiuri_giants"));
        assert_eq!(back.columns(), vec!["player", "HR", "team"]);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        let table = StatTable::new(vec![row(&[("a", "1")])]);
        write_table(&table, &path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n1\n");
    }

    #[test]
    fn test_write_quotes_delimiters() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("q.csv");

        let table = StatTable::new(vec![row(&[("player", "Smith, Jr.")])]);
        write_table(&table, &path, &[]).unwrap();

        let back = read_table(&path).unwrap();
        assert_eq!(back.rows[0].get("player"), Some("Smith, Jr."));
    }

    #[test]
    fn test_tag_overrides_existing_value() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("o.csv");

        let table = StatTable::new(vec![row(&[("team", "old"), ("w", "3")])]);
        write_table(&table, &path, &[("team", "new")]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "team,w\nnew,3\n");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_table(&tmp.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, NpbStatsError::Io { .. }));
    }

    #[test]
    fn test_concat_widens_columns() {
        let a = StatTable::new(vec![row(&[("player", "A"), ("HR", "1")])]);
        let b = StatTable::new(vec![row(&[("player", "B"), ("SB", "4")])]);

        let merged = concat_tables([a, b]);

        assert_eq!(merged.columns(), vec!["player", "HR", "SB"]);
        assert_eq!(merged.rows[0].get("SB"), Some(""));
        assert_eq!(merged.rows[1].get("HR"), Some(""));
    }

    #[test]
    fn test_concat_is_order_independent_as_multiset() {
        let a = StatTable::new(vec![row(&[("player", "A")]), row(&[("player", "A2")])]);
        let b = StatTable::new(vec![row(&[("player", "B")])]);

        let mut ab: Vec<_> = concat_tables([a.clone(), b.clone()])
            .rows
            .iter()
            .map(|r| r.get("player").unwrap().to_string())
            .collect();
        let mut ba: Vec<_> = concat_tables([b, a])
            .rows
            .iter()
            .map(|r| r.get("player").unwrap().to_string())
            .collect();
        ab.sort();
        ba.sort();
        assert_eq!(ab, ba);
    }
}
