//! Field validators
//!
//! Each check is an independent function over the table and schema. They run
//! in a fixed order so findings replay deterministically.

pub mod presence;
pub mod types;
pub mod vocabulary;

use biored_schema::TemplateSchema;
use tracing::debug;

use crate::finding::Finding;
use crate::table::SubmissionTable;

/// Signature shared by all field checks.
pub type FieldCheck = fn(&SubmissionTable, &TemplateSchema) -> Vec<Finding>;

/// Field checks in replay order.
pub const FIELD_CHECKS: [(&str, FieldCheck); 3] = [
    ("presence", presence::check),
    ("type", types::check),
    ("enum", vocabulary::check),
];

/// Run every field check and concatenate their findings.
pub fn run_field_checks(table: &SubmissionTable, schema: &TemplateSchema) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (name, check) in FIELD_CHECKS {
        let found = check(table, schema);
        debug!(check = name, findings = found.len(), "field check complete");
        findings.extend(found);
    }
    findings
}
