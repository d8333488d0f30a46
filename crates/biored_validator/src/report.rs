//! Validation report and its renderings

use biored_schema::TemplateId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::finding::{Finding, FindingCode, Severity};
use crate::metrics::Metrics;
use crate::verdict::Verdict;

const RULE: &str = "============================================================";

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub template_id: TemplateId,
    /// Partner region label supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub verdict: Verdict,
    /// Sorted error, warning, info
    pub findings: Vec<Finding>,
    pub metrics: Metrics,
}

/// Finding counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FindingSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Outcome of one group of checks in the text report.
///
/// Ordered by seriousness: `Pass < Warning < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Fail => "FAIL",
        }
    }
}

/// Check groups and the findings that belong to each.
const CHECK_GROUPS: [(&str, fn(&Finding) -> bool); 6] = [
    ("schema_compliance", |f| {
        f.code == FindingCode::MissingRequiredField && f.row.is_none()
    }),
    ("required_values", |f| {
        f.code == FindingCode::MissingRequiredField && f.row.is_some()
    }),
    ("data_types", |f| f.code == FindingCode::TypeMismatch),
    ("dropdown_validation", |f| f.code == FindingCode::InvalidEnumValue),
    ("completeness", |f| f.code == FindingCode::LowCompleteness),
    ("duplicates", |f| {
        matches!(f.code, FindingCode::DuplicateRows | FindingCode::DuplicateId)
    }),
];

impl ValidationReport {
    /// PASS/WARNING/FAIL per check group, from the worst finding in it.
    /// Enhancement targets are listed only for templates that carry rules.
    pub fn check_statuses(&self) -> Vec<(&'static str, CheckStatus)> {
        let mut statuses: Vec<(&'static str, CheckStatus)> = CHECK_GROUPS
            .iter()
            .map(|(name, belongs)| (*name, self.group_status(belongs)))
            .collect();
        if !self.template_id.schema().rules.is_empty() {
            statuses.push((
                "enhancement_targets",
                self.group_status(&|f: &Finding| f.code == FindingCode::EnhancementTargetMissed),
            ));
        }
        statuses
    }

    fn group_status(&self, belongs: &dyn Fn(&Finding) -> bool) -> CheckStatus {
        self.findings
            .iter()
            .filter(|f| belongs(f))
            .map(|f| match f.severity {
                Severity::Error => CheckStatus::Fail,
                Severity::Warning => CheckStatus::Warning,
                Severity::Info => CheckStatus::Pass,
            })
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    pub fn summary(&self) -> FindingSummary {
        let mut summary = FindingSummary::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn findings_with(&self, code: FindingCode) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.code == code)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Human-readable report: verdict, findings by severity, metrics.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "VALIDATION REPORT: {} ({})",
            self.template_id,
            self.template_id.display_name()
        )?;
        if let Some(region) = &self.region {
            writeln!(f, "Region: {}", region)?;
        }
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Verdict: {}", self.verdict)?;

        let summary = self.summary();
        writeln!(
            f,
            "Errors: {}  Warnings: {}  Info: {}",
            summary.errors, summary.warnings, summary.info
        )?;

        writeln!(f)?;
        writeln!(f, "VALIDATION CHECKS:")?;
        for (name, status) in self.check_statuses() {
            writeln!(f, "  [{}] {}", status.as_str(), name)?;
        }

        for (severity, title) in [
            (Severity::Error, "ERRORS"),
            (Severity::Warning, "WARNINGS"),
            (Severity::Info, "INFO"),
        ] {
            let mut group = self.findings.iter().filter(|x| x.severity == severity).peekable();
            if group.peek().is_none() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}:", title)?;
            for finding in group {
                writeln!(f, "  {}", finding)?;
            }
        }

        let m = &self.metrics;
        writeln!(f)?;
        writeln!(f, "METRICS:")?;
        writeln!(f, "  Rows: {}", m.total_rows)?;
        writeln!(
            f,
            "  Overall completeness: {:.1}%",
            m.overall_completeness * 100.0
        )?;
        writeln!(f, "  Duplicate rows: {}", m.duplicate_rows)?;
        writeln!(f, "  Fields used: {}/{}", m.fields_used, m.fields_total)?;
        if !m.completeness.is_empty() {
            writeln!(f, "  Completeness by required field:")?;
            for (field, ratio) in &m.completeness {
                writeln!(f, "    {}: {:.1}%", field, ratio * 100.0)?;
            }
        }
        write!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::aggregate;
    use std::collections::BTreeMap;

    fn sample() -> ValidationReport {
        let mut completeness = BTreeMap::new();
        completeness.insert("Funding_ID".to_string(), 1.0);
        completeness.insert("Program_Name".to_string(), 2.0 / 3.0);
        let metrics = Metrics {
            completeness,
            overall_completeness: 5.0 / 6.0,
            duplicate_rows: 0,
            total_rows: 3,
            fields_used: 2,
            fields_total: 2,
            field_usage: BTreeMap::new(),
        };
        aggregate(
            TemplateId::FundingSources,
            Some("Portugal (PT16)".into()),
            vec![
                Finding::new(FindingCode::LowCompleteness, "Overall completeness 83.3% is below the 95% target"),
                Finding::new(FindingCode::MissingRequiredField, "Required field 'Program_Name' is empty")
                    .with_field("Program_Name")
                    .with_row(2),
            ],
            metrics,
        )
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let report = sample();
        let json = report.to_json().unwrap();
        assert_eq!(ValidationReport::from_json(&json).unwrap(), report);
    }

    #[test]
    fn test_json_shape() {
        let value: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["template_id"], "4_Funding_Sources");
        assert_eq!(value["region"], "Portugal (PT16)");
        assert_eq!(value["verdict"], "REJECTED");
        assert_eq!(value["findings"][0]["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(value["metrics"]["total_rows"], 3);
        assert!(value["metrics"]["completeness"]["Program_Name"].is_f64());
    }

    #[test]
    fn test_region_omitted_when_absent() {
        let mut report = sample();
        report.region = None;
        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert!(value.get("region").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(
            summary,
            FindingSummary {
                errors: 1,
                warnings: 1,
                info: 0
            }
        );
    }

    #[test]
    fn test_text_rendering() {
        let text = sample().render_text();
        assert!(text.contains("VALIDATION REPORT: 4_Funding_Sources (Funding Sources)"));
        assert!(text.contains("Region: Portugal (PT16)"));
        assert!(text.contains("Verdict: REJECTED"));
        assert!(text.contains("ERRORS:\n  [MISSING_REQUIRED_FIELD] Program_Name (row 2)"));
        assert!(text.contains("WARNINGS:\n  [LOW_COMPLETENESS]"));
        assert!(!text.contains("INFO:"));
        assert!(text.contains("    Program_Name: 66.7%"));
        assert!(text.find("ERRORS:") < text.find("WARNINGS:"));
        assert!(text.contains("VALIDATION CHECKS:\n  [PASS] schema_compliance\n  [FAIL] required_values"));
        assert!(text.contains("  [WARNING] completeness"));
        assert!(!text.contains("enhancement_targets"));
    }

    #[test]
    fn test_check_statuses() {
        let statuses: BTreeMap<_, _> = sample().check_statuses().into_iter().collect();
        assert_eq!(statuses["schema_compliance"], CheckStatus::Pass);
        assert_eq!(statuses["required_values"], CheckStatus::Fail);
        assert_eq!(statuses["data_types"], CheckStatus::Pass);
        assert_eq!(statuses["completeness"], CheckStatus::Warning);

        let registry = aggregate(
            TemplateId::OrganizationRegistry,
            None,
            vec![Finding::new(FindingCode::EnhancementTargetMissed, "Only 3 enhanced organizations")],
            sample().metrics,
        );
        let statuses: BTreeMap<_, _> = registry.check_statuses().into_iter().collect();
        assert_eq!(statuses["enhancement_targets"], CheckStatus::Warning);
        assert_eq!(statuses["required_values"], CheckStatus::Pass);
    }
}
