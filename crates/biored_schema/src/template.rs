//! Template identifiers and schemas
//!
//! The nine templates form a closed set. Code that knows which template it
//! wants uses [`TemplateId`] directly; caller-supplied strings go through
//! [`TemplateId::from_str`] and fail with [`UnknownTemplateError`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

use crate::field::{normalize_name, FieldDefinition, FieldFlag};
use crate::registry::TEMPLATES;

/// Template identifier was not one of the nine known templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template '{0}'")]
pub struct UnknownTemplateError(pub String);

/// One of the nine partner templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateId {
    OrganizationRegistry,
    StakeholderMapping,
    ValueChainMapping,
    FundingSources,
    FocusGroupNotes,
    InterviewSummary,
    BusinessCaseProfile,
    TrendBrief,
    PolicyAnalysis,
}

impl TemplateId {
    /// All templates, in template-number order.
    pub const ALL: [TemplateId; 9] = [
        TemplateId::OrganizationRegistry,
        TemplateId::StakeholderMapping,
        TemplateId::ValueChainMapping,
        TemplateId::FundingSources,
        TemplateId::FocusGroupNotes,
        TemplateId::InterviewSummary,
        TemplateId::BusinessCaseProfile,
        TemplateId::TrendBrief,
        TemplateId::PolicyAnalysis,
    ];

    /// Canonical identifier (e.g. `1_Organization_Registry`).
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::OrganizationRegistry => "1_Organization_Registry",
            TemplateId::StakeholderMapping => "2_Stakeholder_Mapping",
            TemplateId::ValueChainMapping => "3_Value_Chain_Mapping",
            TemplateId::FundingSources => "4_Funding_Sources",
            TemplateId::FocusGroupNotes => "5_Focus_Group_Notes",
            TemplateId::InterviewSummary => "6_Interview_Summary",
            TemplateId::BusinessCaseProfile => "7_Business_Case_Profile",
            TemplateId::TrendBrief => "8_Trend_Brief",
            TemplateId::PolicyAnalysis => "9_Policy_Analysis",
        }
    }

    /// Template number as printed on the partner templates (1-9).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TemplateId::OrganizationRegistry => "Organization Registry",
            TemplateId::StakeholderMapping => "Stakeholder Mapping",
            TemplateId::ValueChainMapping => "Value Chain Mapping",
            TemplateId::FundingSources => "Funding Sources",
            TemplateId::FocusGroupNotes => "Focus Group Notes",
            TemplateId::InterviewSummary => "Interview Summary",
            TemplateId::BusinessCaseProfile => "Business Case Profile",
            TemplateId::TrendBrief => "Trend Brief",
            TemplateId::PolicyAnalysis => "Policy Analysis",
        }
    }

    /// The static schema for this template.
    pub fn schema(self) -> &'static TemplateSchema {
        &TEMPLATES[self as usize]
    }

    fn from_number(number: u32) -> Option<TemplateId> {
        match number {
            1..=9 => Some(TemplateId::ALL[number as usize - 1]),
            _ => None,
        }
    }

    /// Identify the template from an uploaded file name.
    ///
    /// Partner files are named after the template they were copied from,
    /// e.g. `4_Funding_Sources_PT16.xlsx`. The leading template number wins;
    /// a file without one is matched on the template name prefix.
    pub fn from_file_name(file_name: &str) -> Option<TemplateId> {
        let trimmed = file_name.trim();
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return digits.parse().ok().and_then(Self::from_number);
        }

        let normalized = normalize_name(trimmed);
        TemplateId::ALL
            .into_iter()
            .find(|id| normalized.starts_with(&normalize_name(id.display_name())))
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = UnknownTemplateError;

    /// Accepts `4_Funding_Sources`, `Funding Sources` (any case) or `4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse()
                .ok()
                .and_then(Self::from_number)
                .ok_or_else(|| UnknownTemplateError(s.to_string()));
        }

        let normalized = normalize_name(trimmed);
        TemplateId::ALL
            .into_iter()
            .find(|id| {
                normalized == normalize_name(id.as_str())
                    || normalized == normalize_name(id.display_name())
            })
            .ok_or_else(|| UnknownTemplateError(s.to_string()))
    }
}

impl Serialize for TemplateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Minimum counts for the Organization Registry enhancement exercise.
///
/// Partners both enrich organizations already known from CORDIS ("enhanced")
/// and add organizations CORDIS does not know ("new").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnhancementTargets {
    /// Minimum rows carrying the enhancement marker
    pub min_enhanced: usize,
    /// Minimum rows without the marker
    pub min_new: usize,
    /// Minimum average populated optional fields per enhanced row
    pub min_fields_per_enhanced: usize,
}

/// `then_required` must be populated on rows where `when_field` equals
/// `equals` (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionalRequirement {
    pub when_field: &'static str,
    pub equals: &'static str,
    pub then_required: &'static str,
}

/// Checks that only some templates carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateRules {
    pub enhancement: Option<EnhancementTargets>,
    pub conditional: &'static [ConditionalRequirement],
}

impl TemplateRules {
    pub const NONE: TemplateRules = TemplateRules {
        enhancement: None,
        conditional: &[],
    };

    pub fn is_empty(&self) -> bool {
        self.enhancement.is_none() && self.conditional.is_empty()
    }
}

/// A template schema - immutable definition of one partner template.
#[derive(Debug, Serialize)]
pub struct TemplateSchema {
    /// Which template this is
    pub id: TemplateId,

    /// Worksheet partners fill in
    pub sheet_name: &'static str,

    /// Fields in template column order
    pub fields: &'static [FieldDefinition],

    /// Template-specific enhancement rules
    pub rules: TemplateRules,
}

impl TemplateSchema {
    /// Look up a field by header text (case/whitespace-insensitive).
    pub fn field(&self, name: &str) -> Option<&'static FieldDefinition> {
        self.fields.iter().find(|f| f.matches_header(name))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &'static FieldDefinition> {
        self.fields.iter().filter(|f| !f.required)
    }

    /// Dropdown fields with their allowed values.
    pub fn enum_fields(
        &self,
    ) -> impl Iterator<Item = (&'static FieldDefinition, &'static [&'static str])> {
        self.fields
            .iter()
            .filter_map(|f| f.field_type.allowed_values().map(|values| (f, values)))
    }

    pub fn flagged(&self, flag: FieldFlag) -> Option<&'static FieldDefinition> {
        self.fields.iter().find(|f| f.has_flag(flag))
    }
}
