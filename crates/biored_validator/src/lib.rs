//! BIO-RED Validator
//!
//! Validates partner spreadsheet submissions against the nine BIO-RED
//! templates and produces a [`ValidationReport`] with a verdict, findings and
//! completeness metrics.
//!
//! # Pipeline
//!
//! ```text
//! bytes -> loader -> SubmissionTable -> presence -> type -> enum
//!       -> metrics -> template rules -> aggregate -> ValidationReport
//! ```
//!
//! Structural failures (unknown template, unreadable or empty file) are
//! returned as [`ValidationError`]. Everything else is a [`Finding`].
//!
//! # Example
//!
//! ```rust,ignore
//! use biored_validator::{validate_named, ValidatorConfig};
//!
//! let bytes = std::fs::read("4_Funding_Sources_PT16.xlsx")?;
//! let report = validate_named(&bytes, "4_Funding_Sources", Some("PT16"), &ValidatorConfig::default())?;
//! println!("{}", report.verdict);
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod finding;
pub mod loader;
pub mod metrics;
pub mod report;
pub mod rules;
pub mod table;
pub mod verdict;

pub use config::ValidatorConfig;
pub use error::{ConfigError, LoadError, ValidationError};
pub use finding::{Finding, FindingCode, Severity};
pub use loader::{load, load_for_schema, LoadOutcome};
pub use metrics::Metrics;
pub use report::{CheckStatus, FindingSummary, ValidationReport};
pub use table::{CellValue, Column, SubmissionTable};
pub use verdict::{aggregate, Verdict};

use biored_schema::{TemplateId, TemplateSchema};
use tracing::{info, info_span};

/// Validate uploaded `.xlsx` bytes against a template.
pub fn validate(
    file_bytes: &[u8],
    template: TemplateId,
    region: Option<&str>,
    config: &ValidatorConfig,
) -> Result<ValidationReport, ValidationError> {
    let span = info_span!("validate", template = %template, region = region.unwrap_or("-"));
    let _enter = span.enter();

    let schema = template.schema();
    let LoadOutcome { table, findings } = loader::load_for_schema(file_bytes, schema, config)?;
    Ok(run_pipeline(&table, schema, region, config, findings))
}

/// Like [`validate`], with the template named by a caller-supplied string.
pub fn validate_named(
    file_bytes: &[u8],
    template_id: &str,
    region: Option<&str>,
    config: &ValidatorConfig,
) -> Result<ValidationReport, ValidationError> {
    let template: TemplateId = template_id.parse()?;
    validate(file_bytes, template, region, config)
}

/// Validate an already-loaded table. Never fails: content issues are findings.
pub fn validate_table(
    table: &SubmissionTable,
    schema: &TemplateSchema,
    region: Option<&str>,
    config: &ValidatorConfig,
) -> ValidationReport {
    run_pipeline(table, schema, region, config, Vec::new())
}

fn run_pipeline(
    table: &SubmissionTable,
    schema: &TemplateSchema,
    region: Option<&str>,
    config: &ValidatorConfig,
    mut findings: Vec<Finding>,
) -> ValidationReport {
    findings.extend(checks::run_field_checks(table, schema));

    let (metrics, metric_findings) = metrics::calculate(table, schema, config);
    findings.extend(metric_findings);
    findings.extend(rules::check(table, schema));
    for finding in &mut findings {
        finding.sheet_row = finding
            .row
            .and_then(|row| row.checked_sub(1))
            .and_then(|index| table.source_row(index));
    }

    let report = aggregate(schema.id, region.map(str::to_string), findings, metrics);
    let summary = report.summary();
    info!(
        template = %schema.id,
        verdict = %report.verdict,
        rows = report.metrics.total_rows,
        errors = summary.errors,
        warnings = summary.warnings,
        "validation complete"
    );
    report
}
