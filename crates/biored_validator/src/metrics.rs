//! Completeness, duplicate and usage metrics

use biored_schema::{FieldFlag, TemplateSchema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::ValidatorConfig;
use crate::finding::{Finding, FindingCode};
use crate::table::SubmissionTable;

/// Summary statistics for a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Filled ratio per required field, in `[0, 1]`
    pub completeness: BTreeMap<String, f64>,
    /// Unweighted mean of `completeness`
    pub overall_completeness: f64,
    /// Rows beyond the first in each group of identical required-field keys
    pub duplicate_rows: usize,
    pub total_rows: usize,
    /// Header columns with at least one filled cell
    pub fields_used: usize,
    pub fields_total: usize,
    /// Filled ratio per header column
    pub field_usage: BTreeMap<String, f64>,
}

/// Compute metrics and the findings they imply.
pub fn calculate(
    table: &SubmissionTable,
    schema: &TemplateSchema,
    config: &ValidatorConfig,
) -> (Metrics, Vec<Finding>) {
    let total_rows = table.row_count();
    let (completeness, overall_completeness) = completeness(table, schema);
    let duplicate_rows = count_duplicate_rows(table, schema);

    let field_usage: BTreeMap<String, f64> = table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), ratio(c.filled_count(), total_rows)))
        .collect();
    let fields_used = table.columns().iter().filter(|c| c.filled_count() > 0).count();

    let mut findings = Vec::new();

    if overall_completeness < config.completeness_target {
        findings.push(Finding::new(
            FindingCode::LowCompleteness,
            format!(
                "Overall completeness {:.1}% is below the {:.0}% target",
                overall_completeness * 100.0,
                config.completeness_target * 100.0
            ),
        ));
    }

    for field in schema.required_fields() {
        let Some(column) = table.column(field.name) else {
            continue;
        };
        let filled = ratio(column.filled_count(), total_rows);
        if filled < config.field_completeness_floor {
            findings.push(
                Finding::new(
                    FindingCode::LowFieldCompleteness,
                    format!(
                        "'{}' is only {:.1}% complete",
                        field.name,
                        filled * 100.0
                    ),
                )
                .with_field(field.name),
            );
        }
    }

    if duplicate_rows > 0 {
        findings.push(
            Finding::new(
                FindingCode::DuplicateRows,
                format!(
                    "{} row(s) repeat an earlier row on every required field",
                    duplicate_rows
                ),
            )
            .with_count(duplicate_rows),
        );
    }

    if let Some(id_field) = schema.flagged(FieldFlag::PrimaryId) {
        let repeated = count_duplicate_ids(table, id_field.name);
        if repeated > 0 {
            findings.push(
                Finding::new(
                    FindingCode::DuplicateId,
                    format!("{} row(s) reuse an existing {} value", repeated, id_field.name),
                )
                .with_field(id_field.name)
                .with_count(repeated),
            );
        }
    }

    let metrics = Metrics {
        completeness,
        overall_completeness,
        duplicate_rows,
        total_rows,
        fields_used,
        fields_total: table.columns().len(),
        field_usage,
    };
    (metrics, findings)
}

/// Per-required-field ratios and their unweighted mean.
///
/// A required field absent from the header counts as 0.0. A template with no
/// required fields is fully complete.
pub fn completeness(table: &SubmissionTable, schema: &TemplateSchema) -> (BTreeMap<String, f64>, f64) {
    let total = table.row_count();
    let per_field: BTreeMap<String, f64> = schema
        .required_fields()
        .map(|field| {
            let filled = table.column(field.name).map(|c| c.filled_count()).unwrap_or(0);
            (field.name.to_string(), ratio(filled, total))
        })
        .collect();

    let overall = if per_field.is_empty() {
        1.0
    } else {
        per_field.values().sum::<f64>() / per_field.len() as f64
    };
    (per_field, overall)
}

/// Rows beyond the first of each group with identical required-field keys.
///
/// Keys are trimmed and case-folded. Rows whose key is entirely empty are
/// ignored. Independent of row order.
pub fn count_duplicate_rows(table: &SubmissionTable, schema: &TemplateSchema) -> usize {
    let key_columns: Vec<_> = schema
        .required_fields()
        .filter_map(|f| table.column(f.name))
        .collect();
    if key_columns.is_empty() {
        return 0;
    }

    let mut groups: HashMap<Vec<String>, usize> = HashMap::new();
    for row in 0..table.row_count() {
        let key: Vec<String> = key_columns
            .iter()
            .map(|c| table.cell(Some(c), row).as_text().to_lowercase())
            .collect();
        if key.iter().all(String::is_empty) {
            continue;
        }
        *groups.entry(key).or_insert(0) += 1;
    }
    groups.values().map(|n| n - 1).sum()
}

/// Non-empty values of `field` beyond their first occurrence.
pub fn count_duplicate_ids(table: &SubmissionTable, field: &str) -> usize {
    let Some(column) = table.column(field) else {
        return 0;
    };
    let mut seen: HashMap<String, usize> = HashMap::new();
    for cell in column.cells.iter().filter(|c| !c.is_empty()) {
        *seen.entry(cell.as_text().to_lowercase()).or_insert(0) += 1;
    }
    seen.values().map(|n| n - 1).sum()
}

fn ratio(filled: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        filled as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biored_schema::TemplateId;

    const HEADER: [&str; 5] = [
        "Funding_ID",
        "Program_Name",
        "Funding_Type",
        "Source_Organization",
        "Level",
    ];

    fn funding_row(n: usize) -> Vec<String> {
        vec![
            format!("F-{n}"),
            format!("Program {n}"),
            "Grant".into(),
            "EC".into(),
            "EU".into(),
        ]
    }

    fn table(rows: &[Vec<String>]) -> SubmissionTable {
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        SubmissionTable::from_rows(&HEADER, &rows)
    }

    #[test]
    fn test_completeness_mean() {
        let mut rows: Vec<_> = (1..=4).map(funding_row).collect();
        rows[0][1] = String::new();
        rows[1][1] = String::new();
        let (per_field, overall) = completeness(&table(&rows), TemplateId::FundingSources.schema());
        assert_eq!(per_field["Program_Name"], 0.5);
        assert_eq!(per_field["Funding_ID"], 1.0);
        assert!((overall - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_absent_required_column_counts_zero() {
        let table = SubmissionTable::from_rows(&HEADER[..4], &[vec!["F-1", "P", "Grant", "EC"]]);
        let (per_field, overall) = completeness(&table, TemplateId::FundingSources.schema());
        assert_eq!(per_field["Level"], 0.0);
        assert!((overall - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_duplicates_counted_beyond_first() {
        let mut rows: Vec<_> = (1..=5).map(funding_row).collect();
        rows.extend(std::iter::repeat(funding_row(99)).take(10));
        assert_eq!(
            count_duplicate_rows(&table(&rows), TemplateId::FundingSources.schema()),
            9
        );
    }

    #[test]
    fn test_duplicate_key_is_case_folded() {
        let mut second = funding_row(1);
        second[1] = "  PROGRAM 1 ".into();
        let rows = vec![funding_row(1), second];
        assert_eq!(
            count_duplicate_rows(&table(&rows), TemplateId::FundingSources.schema()),
            1
        );
    }

    #[test]
    fn test_empty_keys_ignored() {
        let blank = vec![String::new(); 5];
        let rows = vec![blank.clone(), blank, funding_row(1)];
        assert_eq!(
            count_duplicate_rows(&table(&rows), TemplateId::FundingSources.schema()),
            0
        );
    }

    #[test]
    fn test_calculate_findings() {
        let mut rows: Vec<_> = (1..=10).map(funding_row).collect();
        for row in rows.iter_mut().take(3) {
            row[1] = String::new();
        }
        rows[9][0] = "F-1".into();
        let (metrics, findings) = calculate(
            &table(&rows),
            TemplateId::FundingSources.schema(),
            &ValidatorConfig::default(),
        );
        assert_eq!(metrics.total_rows, 10);
        assert_eq!(metrics.fields_total, 5);
        assert_eq!(metrics.fields_used, 5);
        assert_eq!(metrics.field_usage["Program_Name"], 0.7);

        let codes: Vec<_> = findings.iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec![
                FindingCode::LowCompleteness,
                FindingCode::LowFieldCompleteness,
                FindingCode::DuplicateId,
            ]
        );
        assert_eq!(findings[2].count, Some(1));
    }
}
