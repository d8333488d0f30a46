//! Cell type conformance
//!
//! Text fields accept anything. Dropdown fields are left to the vocabulary
//! check. Empty cells are the presence check's concern and are skipped here.

use biored_schema::{FieldType, TemplateSchema};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::finding::{Finding, FindingCode};
use crate::table::{CellValue, SubmissionTable};

/// Day-first before month-first: partner regions write dates European style.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Excel serial day range: 1900-01-01 through 9999-12-31
const EXCEL_SERIAL_RANGE: std::ops::RangeInclusive<f64> = 1.0..=2_958_465.0;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is a valid regex")
});

pub fn check(table: &SubmissionTable, schema: &TemplateSchema) -> Vec<Finding> {
    let mut findings = Vec::new();

    for field in schema.fields {
        if matches!(field.field_type, FieldType::Text | FieldType::Enum(_)) {
            continue;
        }
        let Some(column) = table.column(field.name) else {
            continue;
        };
        for (idx, cell) in column.cells.iter().enumerate() {
            if cell.is_empty() || conforms(&field.field_type, cell) {
                continue;
            }
            findings.push(
                Finding::new(
                    FindingCode::TypeMismatch,
                    format!(
                        "Expected {} in '{}', got '{}'",
                        field.field_type,
                        field.name,
                        cell.as_text()
                    ),
                )
                .with_field(field.name)
                .with_row(idx + 1),
            );
        }
    }

    findings
}

/// Whether a non-empty cell satisfies a field type.
pub fn conforms(field_type: &FieldType, cell: &CellValue) -> bool {
    match (field_type, cell) {
        (FieldType::Text | FieldType::Enum(_), _) => true,
        (_, CellValue::Error(_)) => false,
        (FieldType::Numeric, CellValue::Number(n)) => n.is_finite(),
        (FieldType::Numeric, CellValue::Text(s)) => is_numeric(s),
        (FieldType::Date, CellValue::Number(n)) => EXCEL_SERIAL_RANGE.contains(n),
        (FieldType::Date, CellValue::Text(s)) => is_date(s),
        (FieldType::Url, CellValue::Text(s)) => is_url(s),
        (FieldType::Email, CellValue::Text(s)) => is_email(s),
        _ => false,
    }
}

pub fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Absolute URL with a scheme and a non-empty host.
pub fn is_url(value: &str) -> bool {
    Url::parse(value.trim())
        .ok()
        .and_then(|url| url.host_str().map(|host| !host.is_empty()))
        .unwrap_or(false)
}

/// `local@domain` with at least one dot in the domain.
pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

pub fn is_date(value: &str) -> bool {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biored_schema::TemplateId;

    #[test]
    fn test_numeric() {
        assert!(is_numeric("42"));
        assert!(is_numeric(" -3.5 "));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric("1,000"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric("twelve"));
    }

    #[test]
    fn test_url() {
        assert!(is_url("https://www.example.org"));
        assert!(is_url("http://example.org/path?q=1"));
        assert!(!is_url("www.example.org"));
        assert!(!is_url("not a url"));
        assert!(!is_url("mailto:someone@example.org"));
    }

    #[test]
    fn test_email_pattern_compiles() {
        assert!(Regex::new(EMAIL_PATTERN.as_str()).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(is_email("contact@example.org"));
        assert!(is_email("first.last@uni.example.pt"));
        assert!(!is_email("contact@example"));
        assert!(!is_email("contact.example.org"));
        assert!(!is_email("a@b@c.org"));
        assert!(!is_email("two words@example.org"));
        assert!(!is_email("a@.org"));
    }

    #[test]
    fn test_date() {
        assert!(is_date("2024-03-15"));
        assert!(is_date("15/03/2024"));
        assert!(is_date("15.03.2024"));
        assert!(is_date("03/25/2024"));
        assert!(is_date("2024-03-15 10:30:00"));
        assert!(!is_date("2024-13-45"));
        assert!(!is_date("next spring"));
    }

    #[test]
    fn test_cell_kinds() {
        assert!(conforms(&FieldType::Numeric, &CellValue::Number(3.0)));
        assert!(conforms(&FieldType::Date, &CellValue::Number(45_000.0)));
        assert!(!conforms(&FieldType::Date, &CellValue::Number(-2.0)));
        assert!(!conforms(&FieldType::Url, &CellValue::Number(3.0)));
        assert!(!conforms(&FieldType::Numeric, &CellValue::Bool(true)));
        assert!(!conforms(&FieldType::Numeric, &CellValue::Error("#DIV/0!".into())));
        assert!(conforms(&FieldType::Text, &CellValue::Error("#N/A".into())));
    }

    #[test]
    fn test_mismatch_finding() {
        let table = SubmissionTable::from_rows(
            &["Organization_ID", "Website", "Employees"],
            &[
                vec!["O-1", "https://acme.example", "12"],
                vec!["O-2", "acme dot com", "a dozen"],
                vec!["O-3", "", ""],
            ],
        );
        let findings = check(&table, TemplateId::OrganizationRegistry.schema());
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.code == FindingCode::TypeMismatch));
        assert!(findings.iter().all(|f| f.row == Some(2)));
        assert_eq!(findings[0].field.as_deref(), Some("Website"));
        assert!(findings[1].message.contains("a dozen"));
        assert!(findings[1].message.contains("numeric"));
    }
}
