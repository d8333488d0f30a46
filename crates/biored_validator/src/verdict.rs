//! Verdict aggregation

use biored_schema::TemplateId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::finding::{Finding, Severity};
use crate::metrics::Metrics;
use crate::report::ValidationReport;

/// Final outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Validated,
    ValidatedWithWarnings,
    Rejected,
}

impl Verdict {
    /// REJECTED iff any error; VALIDATED_WITH_WARNINGS iff any warning;
    /// VALIDATED otherwise.
    pub fn from_findings(findings: &[Finding]) -> Verdict {
        let mut verdict = Verdict::Validated;
        for finding in findings {
            match finding.severity {
                Severity::Error => return Verdict::Rejected,
                Severity::Warning => verdict = Verdict::ValidatedWithWarnings,
                Severity::Info => {}
            }
        }
        verdict
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Validated => "VALIDATED",
            Verdict::ValidatedWithWarnings => "VALIDATED_WITH_WARNINGS",
            Verdict::Rejected => "REJECTED",
        }
    }

    /// Whether the submission may proceed to harmonization.
    pub fn is_accepted(self) -> bool {
        !matches!(self, Verdict::Rejected)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine findings and metrics into a report.
///
/// Findings are stable-sorted error, warning, info; relative order within a
/// severity is preserved.
pub fn aggregate(
    template_id: TemplateId,
    region: Option<String>,
    mut findings: Vec<Finding>,
    metrics: Metrics,
) -> ValidationReport {
    findings.sort_by_key(|f| f.severity);
    ValidationReport {
        template_id,
        region,
        verdict: Verdict::from_findings(&findings),
        findings,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingCode;
    use std::collections::BTreeMap;

    fn metrics() -> Metrics {
        Metrics {
            completeness: BTreeMap::new(),
            overall_completeness: 1.0,
            duplicate_rows: 0,
            total_rows: 1,
            fields_used: 1,
            fields_total: 1,
            field_usage: BTreeMap::new(),
        }
    }

    #[test]
    fn test_verdict_from_severities() {
        assert_eq!(Verdict::from_findings(&[]), Verdict::Validated);
        assert_eq!(
            Verdict::from_findings(&[Finding::new(FindingCode::UnknownColumn, "x")]),
            Verdict::Validated
        );
        assert_eq!(
            Verdict::from_findings(&[
                Finding::new(FindingCode::UnknownColumn, "x"),
                Finding::new(FindingCode::TypeMismatch, "x"),
            ]),
            Verdict::ValidatedWithWarnings
        );
        assert_eq!(
            Verdict::from_findings(&[
                Finding::new(FindingCode::TypeMismatch, "x"),
                Finding::new(FindingCode::MissingRequiredField, "x"),
            ]),
            Verdict::Rejected
        );
    }

    #[test]
    fn test_low_completeness_alone_is_warning_verdict() {
        let report = aggregate(
            TemplateId::FundingSources,
            None,
            vec![Finding::new(FindingCode::LowCompleteness, "below target")],
            metrics(),
        );
        assert_eq!(report.verdict, Verdict::ValidatedWithWarnings);
    }

    #[test]
    fn test_stable_severity_sort() {
        let findings = vec![
            Finding::new(FindingCode::UnknownColumn, "i1"),
            Finding::new(FindingCode::TypeMismatch, "w1"),
            Finding::new(FindingCode::MissingRequiredField, "e1"),
            Finding::new(FindingCode::InvalidEnumValue, "w2"),
            Finding::new(FindingCode::MissingRequiredField, "e2"),
        ];
        let report = aggregate(TemplateId::TrendBrief, None, findings, metrics());
        let messages: Vec<&str> = report.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["e1", "e2", "w1", "w2", "i1"]);
        assert_eq!(report.verdict, Verdict::Rejected);
    }
}
