//! Workbook access
//!
//! Sheets are read once into plain string tables. The first row holds the
//! column names; every other row is data.

use calamine::{open_workbook_auto, Data, Reader};
use scribe_core::{Result, ScribeError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Anything that can hand out named sheets.
pub trait FixtureSource: Send + Sync {
    fn sheet(&self, name: &str) -> Result<&SheetTable>;
}

/// One sheet, with cells already normalised to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A matched row, addressed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureRow {
    values: HashMap<String, String>,
}

impl FixtureRow {
    /// Empty string for columns the sheet does not have.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl SheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ScribeError::ColumnNotFound {
                sheet: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Finds the row whose `column` cell equals `value` exactly.
    ///
    /// The first matching row wins; further matches are reported as a warning.
    pub fn find_row(&self, column: &str, value: &str) -> Result<Option<FixtureRow>> {
        let index = self.column_index(column)?;
        let mut matches = self
            .rows
            .iter()
            .filter(|row| row.get(index).map(String::as_str) == Some(value));

        let Some(first) = matches.next() else {
            return Ok(None);
        };

        let duplicates = matches.count();
        if duplicates > 0 {
            warn!(
                sheet = %self.name,
                column,
                value,
                duplicates,
                "Several fixture rows share one key, using the first"
            );
        }

        let values = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), first.get(i).cloned().unwrap_or_default()))
            .collect();

        Ok(Some(FixtureRow { values }))
    }

    /// Every value of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<&str>> {
        let index = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect())
    }
}

/// All sheets of one workbook.
#[derive(Debug, Clone, Default)]
pub struct FixtureBook {
    sheets: HashMap<String, SheetTable>,
}

impl FixtureBook {
    /// Reads every sheet of an `.xlsx`/`.xls`/`.ods` workbook.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_xlsx(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path).map_err(|e| ScribeError::WorkbookError {
            reason: format!("{}: {e}", path.display()),
        })?;

        let mut sheets = HashMap::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ScribeError::WorkbookError {
                    reason: format!("sheet {name}: {e}"),
                })?;

            let mut rows = range.rows();
            let headers = rows
                .next()
                .map(|header| {
                    header
                        .iter()
                        .map(|cell| match cell {
                            Data::String(s) => s.trim().to_string(),
                            _ => String::new(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let rows = rows
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            let table = SheetTable::new(name.clone(), headers, rows);
            debug!(sheet = %name, rows = table.row_count(), "Loaded fixture sheet");
            sheets.insert(name, table);
        }

        Ok(Self { sheets })
    }

    pub fn from_tables(tables: impl IntoIterator<Item = SheetTable>) -> Self {
        Self {
            sheets: tables
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.sheets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FixtureSource for FixtureBook {
    fn sheet(&self, name: &str) -> Result<&SheetTable> {
        self.sheets.get(name).ok_or_else(|| ScribeError::SheetNotFound {
            sheet: name.to_string(),
        })
    }
}

/// Cell text as a person reading the sheet would type it.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Integral values lose their `.0`; fractions keep up to ten decimals and
/// never switch to scientific notation.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let fixed = format!("{value:.10}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users_table() -> SheetTable {
        SheetTable::new(
            "TBL_CENARIOS",
            vec!["ID_CENARIO".into(), " EMAIL ".into()],
            vec![
                vec!["CT-1".into(), "first@x.com".into()],
                vec!["CT-2".into(), "second@x.com".into()],
                vec!["CT-1".into(), "duplicate@x.com".into()],
                vec!["CT-3".into()],
            ],
        )
    }

    #[test]
    fn test_cell_normalisation() {
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(3.25)), "3.25");
        assert_eq!(cell_text(&Data::Float(12345678901.0)), "12345678901");
        assert_eq!(cell_text(&Data::Float(0.0000001)), "0.0000001");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  padded ".into())), "padded");
    }

    #[test]
    fn test_first_match_wins() {
        let row = users_table().find_row("ID_CENARIO", "CT-1").unwrap().unwrap();
        assert_eq!(row.get("EMAIL"), "first@x.com");
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let row = users_table().find_row("ID_CENARIO", "CT-3").unwrap().unwrap();
        assert_eq!(row.get("EMAIL"), "");
        assert_eq!(row.get("NOT_A_COLUMN"), "");
    }

    #[test]
    fn test_missing_row_and_column() {
        let table = users_table();
        assert!(table.find_row("ID_CENARIO", "CT-99").unwrap().is_none());
        assert!(matches!(
            table.find_row("ID_MASSA", "M-1"),
            Err(ScribeError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_sheet() {
        let book = FixtureBook::from_tables([users_table()]);
        assert!(book.sheet("TBL_CENARIOS").is_ok());
        assert!(matches!(
            book.sheet("TBL_CADASTRO"),
            Err(ScribeError::SheetNotFound { .. })
        ));
    }
}
