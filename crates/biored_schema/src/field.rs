//! Field definitions
//!
//! A field is a named column in a template. Definitions are `const` so the
//! whole registry can live in static memory.

use serde::Serialize;

/// Expected type of the cells in a field.
///
/// Dropdown fields carry their allowed values inside the variant, so an
/// `Enum` field can never exist without a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "allowed_values", rename_all = "snake_case")]
pub enum FieldType {
    /// Free text, always valid
    Text,
    /// Finite decimal number
    Numeric,
    /// Absolute URL with scheme and host
    Url,
    /// Email address (local-part @ domain with a dot)
    Email,
    /// Calendar date
    Date,
    /// Controlled vocabulary (dropdown)
    Enum(&'static [&'static str]),
}

impl FieldType {
    /// Short lowercase name used in findings and JSON.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Numeric => "numeric",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Enum(_) => "enum",
        }
    }

    /// Allowed values for dropdown fields.
    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self {
            FieldType::Enum(values) => Some(values),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Template-specific metadata attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFlag {
    /// Record identifier; repeated values are reported
    PrimaryId,
    /// Populated when the row enhances an existing CORDIS record
    EnhancementMarker,
}

/// A single field in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    /// Canonical column name (e.g. `Organization_Name`)
    pub name: &'static str,

    /// Whether every row must fill this field
    pub required: bool,

    /// Expected cell type
    pub field_type: FieldType,

    /// Template-specific metadata
    #[serde(skip_serializing_if = "no_flags")]
    pub flags: &'static [FieldFlag],
}

fn no_flags(flags: &&'static [FieldFlag]) -> bool {
    flags.is_empty()
}

impl FieldDefinition {
    /// Create a required field
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            required: true,
            field_type,
            flags: &[],
        }
    }

    /// Create an optional field
    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            required: false,
            field_type,
            flags: &[],
        }
    }

    /// Attach metadata flags
    pub const fn with_flags(self, flags: &'static [FieldFlag]) -> Self {
        Self { flags, ..self }
    }

    pub fn has_flag(&self, flag: FieldFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Human-readable label (`Organization_Name` -> `Organization Name`).
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }

    /// Whether a spreadsheet header refers to this field.
    pub fn matches_header(&self, header: &str) -> bool {
        normalize_name(header) == normalize_name(self.name)
    }
}

/// Normalize a column or template name for comparison.
///
/// Trims, drops `*` required-markers, lowercases, and folds runs of
/// whitespace and underscores into a single `_`.
/// `" Organization  Name* "` and `"organization_name"` normalize the same.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch == '*' {
            continue;
        }
        if ch.is_whitespace() || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Organization_Name"), "organization_name");
        assert_eq!(normalize_name("  Organization Name* "), "organization_name");
        assert_eq!(normalize_name("ORGANIZATION__NAME"), "organization_name");
        assert_eq!(normalize_name("_Notes_"), "notes");
        assert_eq!(normalize_name("Post-Market"), "post-market");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_field_constructors() {
        const VALUES: &[&str] = &["High", "Low"];
        let field = FieldDefinition::required("Influence", FieldType::Enum(VALUES));
        assert!(field.required);
        assert_eq!(field.field_type.allowed_values(), Some(VALUES));
        assert_eq!(field.field_type.name(), "enum");

        let field = FieldDefinition::optional("Contact_Email", FieldType::Email)
            .with_flags(&[FieldFlag::PrimaryId]);
        assert!(!field.required);
        assert!(field.has_flag(FieldFlag::PrimaryId));
        assert!(!field.has_flag(FieldFlag::EnhancementMarker));
        assert_eq!(field.label(), "Contact Email");
    }

    #[test]
    fn test_matches_header() {
        let field = FieldDefinition::required("NUTS2_Region", FieldType::Text);
        assert!(field.matches_header("nuts2 region"));
        assert!(field.matches_header("NUTS2_Region*"));
        assert!(!field.matches_header("NUTS2"));
    }

    #[test]
    fn test_field_type_json() {
        let json = serde_json::to_value(FieldType::Enum(&["A", "B"])).unwrap();
        assert_eq!(json["type"], "enum");
        assert_eq!(json["allowed_values"][1], "B");

        let json = serde_json::to_value(FieldType::Url).unwrap();
        assert_eq!(json["type"], "url");
    }
}
