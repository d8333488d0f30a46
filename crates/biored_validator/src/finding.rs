//! Findings: individual validation issues
//!
//! Every check emits [`Finding`]s; the aggregator turns them into a verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
///
/// Ordering is by seriousness: `Error < Warning < Info`, so an ascending sort
/// puts errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable finding code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    MissingRequiredField,
    TypeMismatch,
    InvalidEnumValue,
    LowCompleteness,
    LowFieldCompleteness,
    DuplicateRows,
    DuplicateId,
    UnknownColumn,
    UnexpectedSheet,
    EnhancementTargetMissed,
}

impl FindingCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            FindingCode::TypeMismatch => "TYPE_MISMATCH",
            FindingCode::InvalidEnumValue => "INVALID_ENUM_VALUE",
            FindingCode::LowCompleteness => "LOW_COMPLETENESS",
            FindingCode::LowFieldCompleteness => "LOW_FIELD_COMPLETENESS",
            FindingCode::DuplicateRows => "DUPLICATE_ROWS",
            FindingCode::DuplicateId => "DUPLICATE_ID",
            FindingCode::UnknownColumn => "UNKNOWN_COLUMN",
            FindingCode::UnexpectedSheet => "UNEXPECTED_SHEET",
            FindingCode::EnhancementTargetMissed => "ENHANCEMENT_TARGET_MISSED",
        }
    }

    /// Severity every finding with this code carries.
    pub fn severity(self) -> Severity {
        match self {
            FindingCode::MissingRequiredField => Severity::Error,
            FindingCode::TypeMismatch
            | FindingCode::InvalidEnumValue
            | FindingCode::LowCompleteness
            | FindingCode::DuplicateRows
            | FindingCode::DuplicateId
            | FindingCode::UnexpectedSheet
            | FindingCode::EnhancementTargetMissed => Severity::Warning,
            FindingCode::LowFieldCompleteness | FindingCode::UnknownColumn => Severity::Info,
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Schema field name, when the finding concerns one field
    pub field: Option<String>,
    /// 1-based data row (header excluded), when the finding concerns one row
    pub row: Option<usize>,
    /// Worksheet row number of `row`, as the partner sees it in Excel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_row: Option<usize>,
    pub code: FindingCode,
    pub message: String,
    /// Number of affected rows for aggregate findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Finding {
    pub fn new(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            field: None,
            row: None,
            sheet_row: None,
            code,
            message: message.into(),
            count: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_sheet_row(mut self, sheet_row: usize) -> Self {
        self.sheet_row = Some(sheet_row);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        if let Some(field) = &self.field {
            write!(f, " {}", field)?;
        }
        match (self.row, self.sheet_row, &self.field) {
            (Some(row), Some(sheet_row), Some(_)) => {
                write!(f, " (row {}, sheet row {})", row, sheet_row)?
            }
            (Some(row), None, Some(_)) => write!(f, " (row {})", row)?,
            (Some(row), Some(sheet_row), None) => {
                write!(f, " row {} (sheet row {})", row, sheet_row)?
            }
            (Some(row), None, None) => write!(f, " row {}", row)?,
            (None, _, _) => {}
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        let mut severities = vec![Severity::Info, Severity::Error, Severity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        for code in [
            FindingCode::MissingRequiredField,
            FindingCode::EnhancementTargetMissed,
            FindingCode::LowFieldCompleteness,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_finding_json_shape() {
        let finding = Finding::new(FindingCode::TypeMismatch, "Expected numeric")
            .with_field("Amount")
            .with_row(3);
        let value: serde_json::Value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["field"], "Amount");
        assert_eq!(value["row"], 3);
        assert_eq!(value["code"], "TYPE_MISMATCH");
        assert!(value.get("count").is_none());

        let bare = serde_json::to_value(Finding::new(FindingCode::LowCompleteness, "low")).unwrap();
        assert!(bare["field"].is_null());
        assert!(bare["row"].is_null());
    }

    #[test]
    fn test_display() {
        let finding = Finding::new(FindingCode::MissingRequiredField, "Required field is empty")
            .with_field("Organization_Name")
            .with_row(5);
        assert_eq!(
            finding.to_string(),
            "[MISSING_REQUIRED_FIELD] Organization_Name (row 5): Required field is empty"
        );
        assert_eq!(
            finding.with_sheet_row(7).to_string(),
            "[MISSING_REQUIRED_FIELD] Organization_Name (row 5, sheet row 7): Required field is empty"
        );
    }
}
