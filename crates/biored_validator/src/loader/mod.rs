//! Row/table loader
//!
//! Turns uploaded `.xlsx` bytes into a [`SubmissionTable`]. Structural
//! failures are [`LoadError`]s; a recoverable mismatch (the template's
//! worksheet is missing) is reported as a finding alongside the table.

pub mod xlsx;

use biored_schema::{normalize_name, TemplateSchema};
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::error::LoadError;
use crate::finding::{Finding, FindingCode};
use crate::table::{CellValue, SubmissionTable};
use xlsx::{SheetRow, Workbook};

/// Rows starting with this marker separate template sections.
const SECTION_MARKER: &str = "SECTION";

/// A table loaded for a specific template, with loader findings.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: SubmissionTable,
    pub findings: Vec<Finding>,
}

/// Load the first worksheet; its first non-empty row is the header.
pub fn load(file_bytes: &[u8]) -> Result<SubmissionTable, LoadError> {
    let mut workbook = Workbook::open(file_bytes)?;
    let sheet_name = workbook.sheets()[0].name.clone();
    let rows = workbook.read_rows(0)?;
    let header = first_non_blank(&rows)
        .ok_or_else(|| LoadError::malformed(format!("worksheet '{}' has no rows", sheet_name)))?;
    build_table(&sheet_name, &rows, header)
}

/// Load the worksheet a template expects.
///
/// Falls back to the first worksheet (with an `UNEXPECTED_SHEET` warning)
/// when the template's sheet is absent. The header is the first row within
/// `config.header_scan_rows` that names a schema field, else the first
/// non-empty row.
pub fn load_for_schema(
    file_bytes: &[u8],
    schema: &TemplateSchema,
    config: &ValidatorConfig,
) -> Result<LoadOutcome, LoadError> {
    let mut workbook = Workbook::open(file_bytes)?;
    let mut findings = Vec::new();

    let index = match workbook.find_sheet(schema.sheet_name) {
        Some(index) => index,
        None => {
            let fallback = &workbook.sheets()[0].name;
            warn!(
                expected = schema.sheet_name,
                using = %fallback,
                "expected worksheet not found"
            );
            findings.push(Finding::new(
                FindingCode::UnexpectedSheet,
                format!(
                    "Worksheet '{}' not found; validated '{}' instead",
                    schema.sheet_name, fallback
                ),
            ));
            0
        }
    };
    let sheet_name = workbook.sheets()[index].name.clone();
    let rows = workbook.read_rows(index)?;

    let header = find_header(&rows, schema, config.header_scan_rows)
        .or_else(|| first_non_blank(&rows))
        .ok_or_else(|| LoadError::malformed(format!("worksheet '{}' has no rows", sheet_name)))?;
    debug!(
        sheet = %sheet_name,
        header_row = rows[header].number,
        "located header row"
    );

    let table = build_table(&sheet_name, &rows, header)?;
    Ok(LoadOutcome { table, findings })
}

fn first_non_blank(rows: &[SheetRow]) -> Option<usize> {
    rows.iter().position(|r| !r.is_blank())
}

/// First row within the scan window with a cell naming a schema field.
fn find_header(rows: &[SheetRow], schema: &TemplateSchema, scan_rows: usize) -> Option<usize> {
    rows.iter()
        .take_while(|r| r.number <= scan_rows)
        .position(|row| {
            row.cells
                .iter()
                .any(|cell| !cell.is_empty() && schema.field(&header_text(cell)).is_some())
        })
}

/// Header cell text: trimmed, required-field `*` markers removed.
fn header_text(cell: &CellValue) -> String {
    cell.as_text().replace('*', "").trim().to_string()
}

fn build_table(sheet_name: &str, rows: &[SheetRow], header: usize) -> Result<SubmissionTable, LoadError> {
    let header_cells = &rows[header].cells;
    let header_keys: Vec<String> = header_cells
        .iter()
        .map(|c| normalize_name(&header_text(c)))
        .collect();

    let data: Vec<&SheetRow> = rows[header + 1..]
        .iter()
        .filter(|row| !row.is_blank())
        .filter(|row| !is_section_marker(row))
        .filter(|row| !repeats_header(row, &header_keys))
        .collect();

    if data.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let width = data
        .iter()
        .map(|r| r.cells.len())
        .chain(std::iter::once(header_cells.len()))
        .max()
        .unwrap_or(0);

    // Unnamed columns are kept only when they carry data.
    let mut keep = Vec::with_capacity(width);
    let mut headers = Vec::new();
    for col in 0..width {
        let name = header_cells.get(col).map(header_text).unwrap_or_default();
        let has_data = data
            .iter()
            .any(|r| r.cells.get(col).is_some_and(|c| !c.is_empty()));
        if name.is_empty() && !has_data {
            continue;
        }
        keep.push(col);
        headers.push(if name.is_empty() {
            format!("Column_{}", col + 1)
        } else {
            name
        });
    }

    let cells = data
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&col| row.cells.get(col).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();
    let source_rows = data.iter().map(|r| r.number).collect();

    debug!(
        sheet = sheet_name,
        columns = headers.len(),
        rows = data.len(),
        "loaded table"
    );
    Ok(SubmissionTable::new(sheet_name, headers, cells, source_rows))
}

/// A banner row: column A starts with `SECTION` (case-sensitive) and every
/// other cell is blank.
fn is_section_marker(row: &SheetRow) -> bool {
    match row.cells.split_first() {
        Some((first, rest)) => {
            first.as_text().starts_with(SECTION_MARKER) && rest.iter().all(CellValue::is_empty)
        }
        None => false,
    }
}

/// A data row whose non-empty cells all equal the header cell above them.
fn repeats_header(row: &SheetRow, header_keys: &[String]) -> bool {
    row.cells.iter().enumerate().all(|(col, cell)| {
        cell.is_empty()
            || header_keys
                .get(col)
                .is_some_and(|key| !key.is_empty() && *key == normalize_name(&header_text(cell)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: usize, cells: &[&str]) -> SheetRow {
        SheetRow {
            number,
            cells: cells.iter().map(|c| CellValue::from(*c)).collect(),
        }
    }

    #[test]
    fn test_header_markers_stripped() {
        let rows = vec![row(1, &["Organization_Name*", " Type "]), row(2, &["Acme", "SME"])];
        let table = build_table("Data", &rows, 0).unwrap();
        let headers: Vec<&str> = table.headers().collect();
        assert_eq!(headers, vec!["Organization_Name", "Type"]);
    }

    #[test]
    fn test_unnamed_columns() {
        let rows = vec![
            row(1, &["A", "", "C", ""]),
            row(2, &["1", "2", "3", ""]),
        ];
        let table = build_table("Data", &rows, 0).unwrap();
        let headers: Vec<&str> = table.headers().collect();
        assert_eq!(headers, vec!["A", "Column_2", "C"]);
    }

    #[test]
    fn test_skipped_rows() {
        let rows = vec![
            row(1, &["Name", "Type"]),
            row(2, &["SECTION B: Partners"]),
            row(3, &["", ""]),
            row(4, &["name", "TYPE"]),
            row(5, &["Acme", "SME"]),
        ];
        let table = build_table("Data", &rows, 0).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.source_row(0), Some(5));
    }

    #[test]
    fn test_section_like_data_rows_kept() {
        let rows = vec![
            row(1, &["Policy_ID", "Policy_Name"]),
            row(2, &["", "Section 45 Tax Credit Reform"]),
            row(3, &["Section-12", "Coastal Act"]),
            row(4, &["SECTION 7", "Nature Restoration Law"]),
            row(5, &["Section A: national"]),
            row(6, &["SECTION B: regional"]),
        ];
        let table = build_table("Data", &rows, 0).unwrap();
        let kept: Vec<Option<usize>> = (0..table.row_count()).map(|i| table.source_row(i)).collect();
        assert_eq!(kept, vec![Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_header_only_is_empty_file() {
        let rows = vec![row(1, &["Name", "Type"]), row(2, &["", ""])];
        assert_eq!(build_table("Data", &rows, 0).unwrap_err(), LoadError::EmptyFile);
    }

    #[test]
    fn test_find_header_skips_title_rows() {
        let schema = biored_schema::TemplateId::FundingSources.schema();
        let rows = vec![
            row(1, &["BIO-RED Funding Sources"]),
            row(2, &["Fill one row per funding instrument"]),
            row(3, &["Funding_ID", "Program_Name"]),
            row(4, &["F-1", "Horizon"]),
        ];
        assert_eq!(find_header(&rows, schema, 50), Some(2));
        assert_eq!(find_header(&rows, schema, 2), None);
    }
}
