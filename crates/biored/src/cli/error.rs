//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use biored_schema::TemplateId;
use biored_validator::{ConfigError, ValidationError};
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!(
                    "TRY: Look for similar files: ls {}",
                    parent_display(path)
                ),
            ])
    }

    /// Path exists but is not a directory
    pub fn not_a_directory(path: &Path) -> Self {
        Self::new(format!("Not a directory: {}", path.display()))
            .with_context("The batch command expects a directory of .xlsx files")
            .with_suggestions([
                format!(
                    "TRY: Validate a single file: biored validate {}",
                    path.display()
                ),
                format!("TRY: Validate the parent directory: biored batch {}", parent_display(path)),
            ])
    }

    /// File cannot be read (permission or I/O error)
    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure the file is not open in another program".to_string(),
            ])
    }

    /// Template argument did not name one of the nine templates
    pub fn unknown_template(raw: &str) -> Self {
        Self::new(format!("Unknown template: '{}'", raw))
            .with_context("Templates are named by id, display name or number")
            .with_suggestions([
                "TRY: List the templates: biored templates".to_string(),
                format!(
                    "TRY: For example --template {} or --template 4",
                    TemplateId::FundingSources
                ),
            ])
    }

    /// No --template and the file name carries no template number
    pub fn template_not_inferred(path: &Path) -> Self {
        Self::new(format!(
            "Cannot tell which template {} uses",
            path.display()
        ))
        .with_context("Partner files are expected to start with the template number, e.g. 4_Funding_Sources_PT16.xlsx")
        .with_suggestions([
            format!("TRY: Name the template: biored validate {} --template 4", path.display()),
            "TRY: List the templates: biored templates".to_string(),
        ])
    }

    /// Structural failure while validating a file
    pub fn validation_failed(path: &Path, err: &ValidationError) -> Self {
        let helpful = Self::new(format!("{}: {}", err.kind(), err))
            .with_context(format!("Validating {}", path.display()))
            .with_suggestion(format!("TRY: {}", err.user_message()));
        match err {
            ValidationError::UnknownTemplate(_) => {
                helpful.with_suggestion("TRY: List the templates: biored templates")
            }
            ValidationError::MalformedFile { .. } | ValidationError::EmptyFile => helpful
                .with_suggestion(format!(
                    "TRY: Open the file in a spreadsheet program to inspect it: {}",
                    path.display()
                )),
        }
    }

    /// Config file failed to load or held out-of-range values
    pub fn invalid_config(err: &ConfigError) -> Self {
        Self::new(format!("Invalid configuration: {}", err))
            .with_context("Validator settings come from --config or ~/.biored/config.toml")
            .with_suggestions([
                "TRY: Ratios (completeness_target, field_completeness_floor) must lie between 0 and 1",
                "TRY: header_scan_rows must be at least 1",
                "TRY: Remove the file to fall back to the defaults",
            ])
    }
}

fn parent_display(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string())
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While validating")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While validating"));
        assert!(display.contains("  Try again"));
    }

    #[test]
    fn test_file_not_found() {
        let path = PathBuf::from("/nonexistent/4_Funding_Sources.xlsx");
        let display = HelpfulError::file_not_found(&path).to_string();
        assert!(display.contains("/nonexistent/4_Funding_Sources.xlsx"));
        assert!(display.contains("ls /nonexistent"));
    }

    #[test]
    fn test_validation_failed_carries_user_message() {
        let path = PathBuf::from("upload.xlsx");
        let err = ValidationError::EmptyFile;
        let display = HelpfulError::validation_failed(&path, &err).to_string();
        assert!(display.contains("EmptyFileError"));
        assert!(display.contains(err.user_message()));
        assert!(display.contains("Validating upload.xlsx"));
    }

    #[test]
    fn test_template_not_inferred() {
        let display = HelpfulError::template_not_inferred(Path::new("partner.xlsx")).to_string();
        assert!(display.contains("partner.xlsx"));
        assert!(display.contains("--template"));
    }
}
