//! Dropdown vocabulary membership

use biored_schema::TemplateSchema;

use crate::finding::{Finding, FindingCode};
use crate::table::SubmissionTable;

/// Trimmed, case-insensitive membership of every non-empty dropdown cell.
pub fn check(table: &SubmissionTable, schema: &TemplateSchema) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (field, allowed) in schema.enum_fields() {
        let Some(column) = table.column(field.name) else {
            continue;
        };
        for (idx, cell) in column.cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let value = cell.as_text();
            if is_allowed(&value, allowed) {
                continue;
            }
            findings.push(
                Finding::new(
                    FindingCode::InvalidEnumValue,
                    format!(
                        "Invalid value '{}' for '{}'; allowed: {}",
                        value,
                        field.name,
                        allowed.join(", ")
                    ),
                )
                .with_field(field.name)
                .with_row(idx + 1),
            );
        }
    }

    findings
}

pub fn is_allowed(value: &str, allowed: &[&str]) -> bool {
    let value = value.trim().to_lowercase();
    allowed.iter().any(|a| a.to_lowercase() == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use biored_schema::TemplateId;

    #[test]
    fn test_membership_ignores_case_and_padding() {
        let allowed = ["Grant", "Loan", "Tax_Incentive"];
        assert!(is_allowed("grant", &allowed));
        assert!(is_allowed("  LOAN ", &allowed));
        assert!(is_allowed("tax_incentive", &allowed));
        assert!(!is_allowed("Grnt", &allowed));
        assert!(!is_allowed("Tax Incentive", &allowed));
    }

    #[test]
    fn test_invalid_value_finding() {
        let table = SubmissionTable::from_rows(
            &["Funding_ID", "Funding_Type", "Level"],
            &[
                vec!["F-1", "Grant", "EU"],
                vec!["F-2", "Grnt", "eu"],
                vec!["F-3", "", "Regional"],
            ],
        );
        let findings = check(&table, TemplateId::FundingSources.schema());
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.field.as_deref(), Some("Funding_Type"));
        assert_eq!(finding.row, Some(2));
        assert!(finding.message.contains("Grnt"));
        assert!(finding.message.contains("Grant, Loan"));
    }
}
