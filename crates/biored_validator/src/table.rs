//! In-memory submission table
//!
//! Column-major: every column holds exactly `row_count()` cells. Columns keep
//! the header text as written; lookups by schema field name are
//! case/whitespace-insensitive.

use biored_schema::normalize_name;
use std::borrow::Cow;

/// A cell value as read from the worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet error literal such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Empty, or text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form used in checks and messages.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.trim()),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Bool(true) => Cow::Borrowed("TRUE"),
            CellValue::Bool(false) => Cow::Borrowed("FALSE"),
            CellValue::Error(code) => Cow::Borrowed(code.as_str()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Integral values print without a fractional part (`12`, not `12.0`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One worksheet column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text, trimmed and with required-field markers removed
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

/// A loaded submission: a header plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTable {
    sheet_name: String,
    columns: Vec<Column>,
    /// Worksheet row number of each data row
    source_rows: Vec<usize>,
}

impl SubmissionTable {
    /// Build a table from row-major data. Short rows are padded with empty
    /// cells; cells beyond the header width are dropped.
    pub fn new(
        sheet_name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        source_rows: Vec<usize>,
    ) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(rows.len()),
            })
            .collect();

        let row_count = rows.len();
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(CellValue::Empty));
            }
        }

        let source_rows = if source_rows.len() == row_count {
            source_rows
        } else {
            (2..row_count + 2).collect()
        };

        Self {
            sheet_name: sheet_name.into(),
            columns,
            source_rows,
        }
    }

    /// Convenience constructor from string rows (`""` is an empty cell).
    pub fn from_rows(headers: &[&str], rows: &[Vec<&str>]) -> Self {
        Self::new(
            "Sheet1",
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
            Vec::new(),
        )
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn row_count(&self) -> usize {
        self.source_rows.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column whose header matches `name` after normalization.
    pub fn column(&self, name: &str) -> Option<&Column> {
        let wanted = normalize_name(name);
        self.columns
            .iter()
            .find(|c| normalize_name(&c.name) == wanted)
    }

    /// Cell of `column` on data row `row` (0-based); absent columns read as empty.
    pub fn cell<'a>(&'a self, column: Option<&'a Column>, row: usize) -> &'a CellValue {
        column
            .and_then(|c| c.cells.get(row))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Worksheet row number of data row `row` (0-based).
    pub fn source_row(&self, row: usize) -> Option<usize> {
        self.source_rows.get(row).copied()
    }

    /// A copy with data rows reordered: row `i` of the result is row `order[i]`.
    pub fn reorder_rows(&self, order: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                cells: order.iter().map(|&i| c.cells[i].clone()).collect(),
            })
            .collect();
        Self {
            sheet_name: self.sheet_name.clone(),
            columns,
            source_rows: order.iter().map(|&i| self.source_rows[i]).collect(),
        }
    }
}
