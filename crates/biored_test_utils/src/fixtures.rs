//! Template-shaped rows for tests.
//!
//! `valid_row` produces a row that passes every field check of its template:
//! each cell matches the declared type and dropdowns use their first value.
//! Rows differ by `n` in every text field, so no two rows are duplicates.

use biored_schema::{FieldFlag, FieldType, TemplateId};

use crate::workbook::{Cell, WorkbookBuilder};

/// Header row listing every field of the template in column order.
pub fn header_row(id: TemplateId) -> Vec<Cell> {
    id.schema()
        .fields
        .iter()
        .map(|f| Cell::Text(f.name.to_string()))
        .collect()
}

/// A fully populated, valid data row.
pub fn valid_row(id: TemplateId, n: usize) -> Vec<Cell> {
    id.schema()
        .fields
        .iter()
        .map(|field| {
            if field.has_flag(FieldFlag::PrimaryId) {
                return Cell::Text(format!("ID-{n:04}"));
            }
            match field.field_type {
                FieldType::Text => Cell::Text(format!("{} {n}", field.label())),
                FieldType::Numeric => Cell::Number(n as f64 + 1.0),
                FieldType::Url => Cell::Text(format!("https://partner{n}.example.org")),
                FieldType::Email => Cell::Text(format!("contact{n}@example.org")),
                FieldType::Date => {
                    Cell::Text(format!("2024-{:02}-{:02}", n % 12 + 1, n % 28 + 1))
                }
                FieldType::Enum(values) => Cell::Text(values[0].to_string()),
            }
        })
        .collect()
}

/// Overwrite one field of a row built by [`valid_row`].
pub fn set_field(id: TemplateId, row: &mut [Cell], field: &str, value: impl Into<Cell>) {
    let index = id
        .schema()
        .fields
        .iter()
        .position(|f| f.name == field)
        .unwrap_or_else(|| panic!("{} has no field {}", id, field));
    row[index] = value.into();
}

/// Workbook with the template's sheet, a header and the given data rows.
pub fn workbook(id: TemplateId, rows: Vec<Vec<Cell>>) -> Vec<u8> {
    let mut all = vec![header_row(id)];
    all.extend(rows);
    WorkbookBuilder::new().sheet(id.schema().sheet_name, all).build()
}

/// Workbook with `count` valid rows numbered from 1.
pub fn valid_workbook(id: TemplateId, count: usize) -> Vec<u8> {
    workbook(id, (1..=count).map(|n| valid_row(id, n)).collect())
}
