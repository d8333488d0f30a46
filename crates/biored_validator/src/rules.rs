//! Template-specific rules
//!
//! Only templates that carry rule metadata are checked. Absent columns read
//! as empty, so rules never fail on structure.

use biored_schema::{ConditionalRequirement, EnhancementTargets, FieldFlag, TemplateSchema};
use tracing::debug;

use crate::finding::{Finding, FindingCode};
use crate::table::SubmissionTable;

pub fn check(table: &SubmissionTable, schema: &TemplateSchema) -> Vec<Finding> {
    if schema.rules.is_empty() {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for rule in schema.rules.conditional {
        findings.extend(conditional(table, rule));
    }
    if let Some(targets) = &schema.rules.enhancement {
        findings.extend(enhancement(table, schema, targets));
    }
    debug!(
        template = %schema.id,
        findings = findings.len(),
        "template rules complete"
    );
    findings
}

/// One finding per row where `when_field` equals the trigger value and
/// `then_required` is empty.
fn conditional(table: &SubmissionTable, rule: &ConditionalRequirement) -> Vec<Finding> {
    let Some(trigger) = table.column(rule.when_field) else {
        return Vec::new();
    };
    let required = table.column(rule.then_required);

    trigger
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_text().eq_ignore_ascii_case(rule.equals))
        .filter(|(row, _)| table.cell(required, *row).is_empty())
        .map(|(row, _)| {
            Finding::new(
                FindingCode::EnhancementTargetMissed,
                format!(
                    "'{}' should be filled when {} is '{}'",
                    rule.then_required, rule.when_field, rule.equals
                ),
            )
            .with_field(rule.then_required)
            .with_row(row + 1)
        })
        .collect()
}

/// Enhanced/new organization counts and enhancement depth.
fn enhancement(
    table: &SubmissionTable,
    schema: &TemplateSchema,
    targets: &EnhancementTargets,
) -> Vec<Finding> {
    let marker = schema.flagged(FieldFlag::EnhancementMarker);
    let marker_column = marker.and_then(|m| table.column(m.name));
    let enhanced_rows: Vec<usize> = (0..table.row_count())
        .filter(|&row| !table.cell(marker_column, row).is_empty())
        .collect();
    let enhanced = enhanced_rows.len();
    let new = table.row_count() - enhanced;

    let mut findings = Vec::new();

    if enhanced < targets.min_enhanced {
        findings.push(
            Finding::new(
                FindingCode::EnhancementTargetMissed,
                format!(
                    "{} existing organization(s) enhanced; at least {} expected",
                    enhanced, targets.min_enhanced
                ),
            )
            .with_count(enhanced),
        );
    }

    if new < targets.min_new {
        findings.push(
            Finding::new(
                FindingCode::EnhancementTargetMissed,
                format!(
                    "{} new organization(s) added; at least {} expected",
                    new, targets.min_new
                ),
            )
            .with_count(new),
        );
    }

    if enhanced > 0 {
        let depth_columns: Vec<_> = schema
            .optional_fields()
            .filter(|f| !f.has_flag(FieldFlag::EnhancementMarker))
            .map(|f| table.column(f.name))
            .collect();
        let filled: usize = enhanced_rows
            .iter()
            .map(|&row| {
                depth_columns
                    .iter()
                    .filter(|c| !table.cell(**c, row).is_empty())
                    .count()
            })
            .sum();
        let average = filled as f64 / enhanced as f64;
        if average < targets.min_fields_per_enhanced as f64 {
            findings.push(Finding::new(
                FindingCode::EnhancementTargetMissed,
                format!(
                    "Enhanced organizations average {:.1} additional field(s); at least {} expected",
                    average, targets.min_fields_per_enhanced
                ),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use biored_schema::TemplateId;

    fn org_table(header: &[&str], rows: &[Vec<&str>]) -> SubmissionTable {
        SubmissionTable::from_rows(header, rows)
    }

    #[test]
    fn test_templates_without_rules_are_skipped() {
        let table = org_table(&["Funding_ID"], &[vec!["F-1"]]);
        assert!(check(&table, TemplateId::FundingSources.schema()).is_empty());
    }

    #[test]
    fn test_conditional_requirement() {
        let table = org_table(
            &["Organization_ID", "Type", "Notes", "Employees"],
            &[
                vec!["O-1", "Other", "", "5"],
                vec!["O-2", "other", "Regional network", ""],
                vec!["O-3", "University", "", ""],
                vec!["O-4", "SME", "", ""],
            ],
        );
        let schema = TemplateId::OrganizationRegistry.schema();
        let findings: Vec<_> = schema
            .rules
            .conditional
            .iter()
            .flat_map(|rule| conditional(&table, rule))
            .collect();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].field.as_deref(), Some("Notes"));
        assert_eq!(findings[0].row, Some(1));
        assert_eq!(findings[1].field.as_deref(), Some("Employees"));
        assert_eq!(findings[1].row, Some(4));
    }

    #[test]
    fn test_absent_required_column_reads_empty() {
        let table = org_table(&["Organization_ID", "Type"], &[vec!["O-1", "Other"]]);
        let rule = &TemplateId::OrganizationRegistry.schema().rules.conditional[0];
        assert_eq!(conditional(&table, rule).len(), 1);
    }

    #[test]
    fn test_enhancement_counts() {
        let schema = TemplateId::OrganizationRegistry.schema();
        let targets = schema.rules.enhancement.unwrap();
        let header = ["Organization_ID", "CORDIS_Organization_ID", "Size", "Employees", "Key_Assets"];
        let mut rows = Vec::new();
        for _ in 0..30 {
            rows.push(vec!["O", "999", "Small", "12", "Lab"]);
        }
        for _ in 0..10 {
            rows.push(vec!["N", "", "", "", ""]);
        }
        let table = org_table(&header, &rows);
        assert!(enhancement(&table, schema, &targets).is_empty());

        let table = org_table(&header, &rows[..35]);
        let findings = enhancement(&table, schema, &targets);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].count, Some(5));
    }

    #[test]
    fn test_enhancement_depth() {
        let schema = TemplateId::OrganizationRegistry.schema();
        let targets = EnhancementTargets {
            min_enhanced: 1,
            min_new: 0,
            min_fields_per_enhanced: 3,
        };
        let table = org_table(
            &["Organization_ID", "CORDIS_Organization_ID", "Size"],
            &[vec!["O-1", "999", "Small"]],
        );
        let findings = enhancement(&table, schema, &targets);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("1.0"));
    }
}
