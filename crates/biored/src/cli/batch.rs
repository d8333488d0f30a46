//! Batch command - validate every submission in a directory
//!
//! Each `.xlsx` file is validated against the template named by its file
//! name prefix. A file that cannot be validated at all is listed as `ERROR`
//! and the batch carries on with the next one.

use anyhow::{Context, Result};
use biored_schema::TemplateId;
use biored_validator::{FindingSummary, ValidationReport, ValidatorConfig, Verdict};
use comfy_table::Color;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::error::HelpfulError;
use crate::cli::output::{color_for_verdict, print_json, print_table_colored};
use crate::Outcome;

/// Arguments for the `batch` command
#[derive(Debug)]
pub struct BatchArgs {
    pub dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Result for one file in the batch
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub file: String,
    pub template: Option<TemplateId>,
    /// Verdict, or `ERROR` when the file could not be validated
    pub status: String,
    #[serde(skip)]
    pub verdict: Option<Verdict>,
    #[serde(flatten)]
    pub summary: FindingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    files: Vec<BatchEntry>,
    accepted: usize,
    rejected: usize,
    failed: usize,
}

pub fn run(args: BatchArgs) -> Result<Outcome> {
    if !args.dir.exists() {
        return Err(HelpfulError::file_not_found(&args.dir).into());
    }
    if !args.dir.is_dir() {
        return Err(HelpfulError::not_a_directory(&args.dir).into());
    }

    let config = super::load_config(args.config.as_deref())?;
    if let Some(out) = &args.output_dir {
        std::fs::create_dir_all(out)
            .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    }

    let files = submission_files(&args.dir);
    info!(dir = %args.dir.display(), files = files.len(), "starting batch");

    let mut entries = Vec::with_capacity(files.len());
    for path in &files {
        let (entry, report) = validate_one(path, &config);
        if let (Some(out), Some(report)) = (&args.output_dir, &report) {
            write_report(out, path, report)?;
        }
        entries.push(entry);
    }

    let output = BatchOutput {
        accepted: entries
            .iter()
            .filter(|e| e.verdict.is_some_and(Verdict::is_accepted))
            .count(),
        rejected: entries
            .iter()
            .filter(|e| e.verdict == Some(Verdict::Rejected))
            .count(),
        failed: entries.iter().filter(|e| e.verdict.is_none()).count(),
        files: entries,
    };

    if args.json {
        print_json(&output)?;
    } else {
        print_summary(&output);
    }

    if output.rejected + output.failed > 0 {
        Ok(Outcome::Rejected)
    } else {
        Ok(Outcome::Accepted)
    }
}

/// `.xlsx` files directly inside `dir`, sorted by name. Excel lock files
/// (`~$...`) are skipped.
pub fn submission_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_submission(path))
        .collect();
    files.sort();
    files
}

fn is_submission(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    let is_lock = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    is_xlsx && !is_lock
}

fn validate_one(path: &Path, config: &ValidatorConfig) -> (BatchEntry, Option<ValidationReport>) {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let template = TemplateId::from_file_name(&file);

    let result = match template {
        None => Err("No template number in the file name".to_string()),
        Some(id) => std::fs::read(path)
            .map_err(|err| err.to_string())
            .and_then(|bytes| {
                biored_validator::validate(&bytes, id, None, config)
                    .map_err(|err| format!("{}: {}", err.kind(), err.user_message()))
            }),
    };

    match result {
        Ok(report) => {
            let entry = BatchEntry {
                file,
                template,
                status: report.verdict.to_string(),
                verdict: Some(report.verdict),
                summary: report.summary(),
                error: None,
            };
            (entry, Some(report))
        }
        Err(message) => {
            warn!(file = %path.display(), error = %message, "file could not be validated");
            let entry = BatchEntry {
                file,
                template,
                status: "ERROR".to_string(),
                verdict: None,
                summary: FindingSummary::default(),
                error: Some(message),
            };
            (entry, None)
        }
    }
}

fn write_report(out_dir: &Path, source: &Path, report: &ValidationReport) -> Result<()> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let target = out_dir.join(format!("{}_validation_report.json", stem));
    let json = report.to_json().context("Failed to serialize report")?;
    std::fs::write(&target, json)
        .with_context(|| format!("Failed to write report: {}", target.display()))
}

fn print_summary(output: &BatchOutput) {
    if output.files.is_empty() {
        println!("No .xlsx files found");
        return;
    }

    let rows = output
        .files
        .iter()
        .map(|entry| {
            let color = entry.verdict.map(color_for_verdict).unwrap_or(Color::Red);
            vec![
                (entry.file.clone(), None),
                (
                    entry
                        .template
                        .map(|t| t.display_name().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    None,
                ),
                (entry.status.clone(), Some(color)),
                (entry.summary.errors.to_string(), None),
                (entry.summary.warnings.to_string(), None),
                (entry.summary.info.to_string(), None),
            ]
        })
        .collect();
    print_table_colored(
        &["FILE", "TEMPLATE", "STATUS", "ERRORS", "WARNINGS", "INFO"],
        rows,
    );

    for entry in &output.files {
        if let Some(error) = &entry.error {
            eprintln!("{}: {}", entry.file, error);
        }
    }
    println!(
        "{} files: {} accepted, {} rejected, {} failed",
        output.files.len(),
        output.accepted,
        output.rejected,
        output.failed
    );
}
