//! Required-field presence

use biored_schema::TemplateSchema;

use crate::finding::{Finding, FindingCode};
use crate::table::SubmissionTable;

/// One error per required column absent from the header, one error per empty
/// required cell, and one info per header column the template does not know.
pub fn check(table: &SubmissionTable, schema: &TemplateSchema) -> Vec<Finding> {
    let mut findings = Vec::new();

    for field in schema.required_fields() {
        match table.column(field.name) {
            None => findings.push(
                Finding::new(
                    FindingCode::MissingRequiredField,
                    format!("Required column '{}' is missing from the header row", field.name),
                )
                .with_field(field.name),
            ),
            Some(column) => {
                for (idx, cell) in column.cells.iter().enumerate() {
                    if cell.is_empty() {
                        findings.push(
                            Finding::new(
                                FindingCode::MissingRequiredField,
                                format!("Required field '{}' is empty", field.name),
                            )
                            .with_field(field.name)
                            .with_row(idx + 1),
                        );
                    }
                }
            }
        }
    }

    for header in table.headers() {
        if schema.field(header).is_none() {
            findings.push(
                Finding::new(
                    FindingCode::UnknownColumn,
                    format!("Column '{}' is not part of the {} template", header, schema.id.display_name()),
                )
                .with_field(header),
            );
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use biored_schema::TemplateId;

    const FUNDING_HEADER: [&str; 5] = [
        "Funding_ID",
        "Program_Name",
        "Funding_Type",
        "Source_Organization",
        "Level",
    ];

    #[test]
    fn test_empty_required_cells() {
        let table = SubmissionTable::from_rows(
            &FUNDING_HEADER,
            &[
                vec!["F-1", "Horizon", "Grant", "EC", "EU"],
                vec!["F-2", "  ", "Grant", "EC", "EU"],
            ],
        );
        let findings = check(&table, TemplateId::FundingSources.schema());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].field.as_deref(), Some("Program_Name"));
        assert_eq!(findings[0].row, Some(2));
    }

    #[test]
    fn test_missing_column_reported_once() {
        let table = SubmissionTable::from_rows(
            &["Funding_ID", "Program_Name", "Funding_Type", "Source_Organization"],
            &[vec!["F-1", "Horizon", "Grant", "EC"], vec!["F-2", "LIFE", "Grant", "EC"]],
        );
        let findings = check(&table, TemplateId::FundingSources.schema());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field.as_deref(), Some("Level"));
        assert_eq!(findings[0].row, None);
    }

    #[test]
    fn test_unknown_column_is_info() {
        let mut header = FUNDING_HEADER.to_vec();
        header.push("Internal Comment");
        let table = SubmissionTable::from_rows(&header, &[vec!["F-1", "Horizon", "Grant", "EC", "EU", "x"]]);
        let findings = check(&table, TemplateId::FundingSources.schema());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, FindingCode::UnknownColumn);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_header_spelling_variants_match() {
        let table = SubmissionTable::from_rows(
            &["funding id", "PROGRAM NAME", "Funding  Type", "source_organization", "level"],
            &[vec!["F-1", "Horizon", "Grant", "EC", "EU"]],
        );
        assert!(check(&table, TemplateId::FundingSources.schema()).is_empty());
    }
}
