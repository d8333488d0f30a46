//! Validate command - check one submission file

use anyhow::Result;
use biored_schema::TemplateId;
use biored_validator::ValidationReport;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::error::HelpfulError;
use crate::cli::output::emit;
use crate::Outcome;

/// Arguments for the `validate` command
#[derive(Debug)]
pub struct ValidateArgs {
    pub file: PathBuf,
    pub template: Option<String>,
    pub region: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<Outcome> {
    if !args.file.is_file() {
        return Err(HelpfulError::file_not_found(&args.file).into());
    }

    let template = resolve_template(args.template.as_deref(), &args.file)?;
    let config = super::load_config(args.config.as_deref())?;

    let bytes = std::fs::read(&args.file)
        .map_err(|err| HelpfulError::cannot_read_file(&args.file, &err.to_string()))?;
    let report = biored_validator::validate(&bytes, template, args.region.as_deref(), &config)
        .map_err(|err| HelpfulError::validation_failed(&args.file, &err))?;

    info!(file = %args.file.display(), verdict = %report.verdict, "validated file");

    let rendered = render(&report, args.json)?;
    emit(&rendered, args.output.as_deref())?;

    Ok(outcome(&report))
}

/// `--template` wins; otherwise the file name's template number.
pub fn resolve_template(explicit: Option<&str>, file: &Path) -> Result<TemplateId> {
    if let Some(raw) = explicit {
        return raw
            .parse::<TemplateId>()
            .map_err(|_| HelpfulError::unknown_template(raw).into());
    }
    file.file_name()
        .and_then(|name| name.to_str())
        .and_then(TemplateId::from_file_name)
        .ok_or_else(|| HelpfulError::template_not_inferred(file).into())
}

pub fn render(report: &ValidationReport, json: bool) -> Result<String> {
    if json {
        Ok(report.to_json()?)
    } else {
        Ok(report.render_text())
    }
}

pub fn outcome(report: &ValidationReport) -> Outcome {
    if report.verdict.is_accepted() {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_template_explicit_wins() {
        let id = resolve_template(Some("funding sources"), Path::new("1_Org.xlsx")).unwrap();
        assert_eq!(id, TemplateId::FundingSources);
    }

    #[test]
    fn test_resolve_template_from_file_name() {
        let id = resolve_template(None, Path::new("uploads/6_Interview_Summary_LT01.xlsx")).unwrap();
        assert_eq!(id, TemplateId::InterviewSummary);
    }

    #[test]
    fn test_resolve_template_failures() {
        let err = resolve_template(Some("Budget"), Path::new("x.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unknown template: 'Budget'"));

        let err = resolve_template(None, Path::new("partner_upload.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Cannot tell which template"));
    }
}
