//! The nine partner templates
//!
//! Field lists and dropdown vocabularies mirror the spreadsheet templates
//! handed to partners. Order within each list is template column order.

use crate::field::FieldType::{Date, Email, Enum, Numeric, Text, Url};
use crate::field::{FieldDefinition, FieldFlag};
use crate::template::{
    ConditionalRequirement, EnhancementTargets, TemplateId, TemplateRules, TemplateSchema,
    UnknownTemplateError,
};

const PRIMARY_ID: &[FieldFlag] = &[FieldFlag::PrimaryId];
const ENHANCEMENT_MARKER: &[FieldFlag] = &[FieldFlag::EnhancementMarker];

const HIGH_MEDIUM_LOW: &[&str] = &["High", "Medium", "Low"];
const HIGH_MEDIUM_LOW_NONE: &[&str] = &["High", "Medium", "Low", "None"];

// ============================================================================
// 1. Organization Registry
// ============================================================================

const ORGANIZATION_TYPES: &[&str] = &[
    "University",
    "Research_Center",
    "SME",
    "Large_Company",
    "Hospital",
    "Government_Agency",
    "NGO",
    "Innovation_Hub",
    "Cluster_Organization",
    "NGO_Association",
    "Other",
];
const COUNTRIES: &[&str] = &["PT", "EL", "LT", "BG", "FR", "DK", "SE"];
const NUTS2_REGIONS: &[&str] = &["PT16", "EL54", "LT01", "BG41", "FR10", "DK01", "SE12"];

const ORGANIZATION_REGISTRY_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Organization_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Organization_Name", Text),
    FieldDefinition::required("Type", Enum(ORGANIZATION_TYPES)),
    FieldDefinition::required("Country", Enum(COUNTRIES)),
    FieldDefinition::required("NUTS2_Region", Enum(NUTS2_REGIONS)),
    FieldDefinition::required("City", Text),
    FieldDefinition::required("Website", Url),
    FieldDefinition::required("Specialization", Text),
    FieldDefinition::optional("CORDIS_Organization_ID", Text).with_flags(ENHANCEMENT_MARKER),
    FieldDefinition::optional("Size", Text),
    FieldDefinition::optional("Employees", Numeric),
    FieldDefinition::optional("Founded_Year", Numeric),
    FieldDefinition::optional("Annual_Revenue", Numeric),
    FieldDefinition::optional("EU_Projects_Count", Numeric),
    FieldDefinition::optional("Total_EU_Funding", Numeric),
    FieldDefinition::optional("Key_Assets", Text),
    FieldDefinition::optional("Innovation_Outputs", Text),
    FieldDefinition::optional("Digital_Capacity", Enum(HIGH_MEDIUM_LOW_NONE)),
    FieldDefinition::optional("Sustainability_Focus", Enum(HIGH_MEDIUM_LOW_NONE)),
    FieldDefinition::optional("Regional_Partnerships", Text),
    FieldDefinition::optional("Market_Reach", Text),
    FieldDefinition::optional("Contact_Email", Email),
    FieldDefinition::optional("Notes", Text),
];

const ORGANIZATION_REGISTRY_RULES: TemplateRules = TemplateRules {
    enhancement: Some(EnhancementTargets {
        min_enhanced: 30,
        min_new: 10,
        min_fields_per_enhanced: 3,
    }),
    conditional: &[
        ConditionalRequirement {
            when_field: "Type",
            equals: "Other",
            then_required: "Notes",
        },
        ConditionalRequirement {
            when_field: "Type",
            equals: "SME",
            then_required: "Employees",
        },
    ],
};

// ============================================================================
// 2. Stakeholder Mapping
// ============================================================================

const STAKEHOLDER_ROLES: &[&str] = &[
    "Researcher",
    "Clinician",
    "Industry_Executive",
    "Policy_Maker",
    "Investor",
    "Entrepreneur",
    "Patient_Advocate",
    "NGO_Representative",
    "Other",
];
const ENGAGEMENT_TYPES: &[&str] = &[
    "Active_Collaboration",
    "Consultation",
    "Information_Sharing",
    "Monitoring",
];

const STAKEHOLDER_MAPPING_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Stakeholder_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Name", Text),
    FieldDefinition::required("Organization", Text),
    FieldDefinition::required("Role", Enum(STAKEHOLDER_ROLES)),
    FieldDefinition::required("Influence", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::required("Interest", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::optional("Email", Email),
    FieldDefinition::optional("Phone", Text),
    FieldDefinition::optional("Engagement_Type", Enum(ENGAGEMENT_TYPES)),
    FieldDefinition::optional("Current_Relationship", Text),
    FieldDefinition::optional("Engagement_History", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 3. Value Chain Mapping
// ============================================================================

const VALUE_CHAIN_STAGES: &[&str] = &[
    "Research",
    "Development",
    "Clinical_Trials",
    "Manufacturing",
    "Distribution",
    "Market_Access",
    "Post-Market",
];

const VALUE_CHAIN_MAPPING_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Chain_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Chain_Name", Text),
    FieldDefinition::required("Description", Text),
    FieldDefinition::required("Stage", Enum(VALUE_CHAIN_STAGES)),
    FieldDefinition::required("Key_Actors", Text),
    FieldDefinition::optional("Technology_Drivers", Text),
    FieldDefinition::optional("Bottlenecks", Text),
    FieldDefinition::optional("Opportunities", Text),
    FieldDefinition::optional("Growth_Potential", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::optional("Regional_Advantage", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 4. Funding Sources
// ============================================================================

const FUNDING_TYPES: &[&str] = &["Grant", "Loan", "Equity", "Tax_Incentive", "Prize", "Other"];
const FUNDING_LEVELS: &[&str] = &["EU", "National", "Regional", "Private", "Mixed"];
const CALL_FREQUENCIES: &[&str] = &["Annual", "Bi-annual", "Quarterly", "Rolling", "One-time"];

const FUNDING_SOURCES_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Funding_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Program_Name", Text),
    FieldDefinition::required("Funding_Type", Enum(FUNDING_TYPES)),
    FieldDefinition::required("Source_Organization", Text),
    FieldDefinition::required("Level", Enum(FUNDING_LEVELS)),
    FieldDefinition::optional("Budget_Range", Text),
    FieldDefinition::optional("Call_Frequency", Enum(CALL_FREQUENCIES)),
    FieldDefinition::optional("Eligibility", Text),
    FieldDefinition::optional("Success_Rate", Text),
    FieldDefinition::optional("Application_Deadline", Date),
    FieldDefinition::optional("Website", Url),
    FieldDefinition::optional("Contact", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 5. Focus Group Notes
// ============================================================================

const FOCUS_GROUP_NOTES_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Session_Date", Date),
    FieldDefinition::required("Location", Text),
    FieldDefinition::required("Facilitator", Text),
    FieldDefinition::required("Number_of_Participants", Numeric),
    FieldDefinition::optional("Participant_List", Text),
    FieldDefinition::optional("Discussion_Topics", Text),
    FieldDefinition::optional("Key_Insights", Text),
    FieldDefinition::optional("Challenges_Identified", Text),
    FieldDefinition::optional("Recommendations", Text),
    FieldDefinition::optional("Follow_up_Actions", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 6. Interview Summary
// ============================================================================

const SECTORS: &[&str] = &[
    "Research",
    "Industry",
    "Clinical",
    "Policy",
    "Investment",
    "NGO",
    "Other",
];
const ORGANIZATION_SIZES: &[&str] = &["Small", "Medium", "Large"];

const INTERVIEW_SUMMARY_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Interview_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Date", Date),
    FieldDefinition::required("Interviewee_Name", Text),
    FieldDefinition::required("Organization", Text),
    FieldDefinition::required("Position", Text),
    FieldDefinition::required("Sector", Enum(SECTORS)),
    FieldDefinition::optional("Organization_Size", Enum(ORGANIZATION_SIZES)),
    FieldDefinition::optional("Key_Challenges", Text),
    FieldDefinition::optional("Opportunities", Text),
    FieldDefinition::optional("Innovation_Examples", Text),
    FieldDefinition::optional("Collaboration_Needs", Text),
    FieldDefinition::optional("Policy_Gaps", Text),
    FieldDefinition::optional("Investment_Barriers", Text),
    FieldDefinition::optional("Success_Factors", Text),
    FieldDefinition::optional("Recommendations", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 7. Business Case Profile
// ============================================================================

const FUNDING_STAGES: &[&str] = &[
    "Pre-seed",
    "Seed",
    "Series_A",
    "Series_B",
    "Series_C+",
    "Bootstrapped",
];
const INNOVATION_TYPES: &[&str] = &["Disruptive", "Incremental", "Platform", "Business_Model"];

const BUSINESS_CASE_PROFILE_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Case_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Company_Name", Text),
    FieldDefinition::required("Founded_Year", Numeric),
    FieldDefinition::required("Technology", Text),
    FieldDefinition::required("Innovation_Type", Enum(INNOVATION_TYPES)),
    FieldDefinition::required("Scalability", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::required("Impact_Potential", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::optional("Founders", Text),
    FieldDefinition::optional("Employees", Numeric),
    FieldDefinition::optional("Funding_Stage", Enum(FUNDING_STAGES)),
    FieldDefinition::optional("Total_Funding", Numeric),
    FieldDefinition::optional("Revenue_Model", Text),
    FieldDefinition::optional("Target_Market", Text),
    FieldDefinition::optional("Key_Partners", Text),
    FieldDefinition::optional("IP_Portfolio", Text),
    FieldDefinition::optional("Clinical_Pipeline", Text),
    FieldDefinition::optional("Regulatory_Status", Text),
    FieldDefinition::optional("Challenges", Text),
    FieldDefinition::optional("Support_Needs", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 8. Trend Brief
// ============================================================================

const TIMEFRAMES: &[&str] = &["Near-term_1-2y", "Mid-term_3-5y", "Long-term_5+y"];

const TREND_BRIEF_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Trend_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Trend_Name", Text),
    FieldDefinition::required("Description", Text),
    FieldDefinition::required("Technology_Drivers", Text),
    FieldDefinition::required("Market_Potential", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::required("Regional_Relevance", Enum(HIGH_MEDIUM_LOW)),
    FieldDefinition::optional("Timeframe", Enum(TIMEFRAMES)),
    FieldDefinition::optional("Key_Players", Text),
    FieldDefinition::optional("Investment_Activity", Text),
    FieldDefinition::optional("Policy_Support", Text),
    FieldDefinition::optional("Barriers", Text),
    FieldDefinition::optional("Opportunities", Text),
    FieldDefinition::optional("Notes", Text),
];

// ============================================================================
// 9. Policy Analysis
// ============================================================================

const IMPLEMENTATION_STATUSES: &[&str] = &["Proposed", "In_Progress", "Implemented", "Under_Review"];

const POLICY_ANALYSIS_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("Policy_ID", Text).with_flags(PRIMARY_ID),
    FieldDefinition::required("Policy_Name", Text),
    FieldDefinition::required("Description", Text),
    FieldDefinition::required("Impact_Assessment", Text),
    FieldDefinition::required("Implementation_Status", Enum(IMPLEMENTATION_STATUSES)),
    FieldDefinition::optional("Notes", Text),
];

/// Indexed by `TemplateId as usize`.
pub(crate) static TEMPLATES: [TemplateSchema; 9] = [
    TemplateSchema {
        id: TemplateId::OrganizationRegistry,
        sheet_name: "Your Input",
        fields: ORGANIZATION_REGISTRY_FIELDS,
        rules: ORGANIZATION_REGISTRY_RULES,
    },
    TemplateSchema {
        id: TemplateId::StakeholderMapping,
        sheet_name: "Stakeholder Mapping",
        fields: STAKEHOLDER_MAPPING_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::ValueChainMapping,
        sheet_name: "Value Chain Mapping",
        fields: VALUE_CHAIN_MAPPING_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::FundingSources,
        sheet_name: "Funding Sources",
        fields: FUNDING_SOURCES_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::FocusGroupNotes,
        sheet_name: "Focus Group Notes",
        fields: FOCUS_GROUP_NOTES_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::InterviewSummary,
        sheet_name: "Interview Summary",
        fields: INTERVIEW_SUMMARY_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::BusinessCaseProfile,
        sheet_name: "Business Case Profile",
        fields: BUSINESS_CASE_PROFILE_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::TrendBrief,
        sheet_name: "Trend Brief",
        fields: TREND_BRIEF_FIELDS,
        rules: TemplateRules::NONE,
    },
    TemplateSchema {
        id: TemplateId::PolicyAnalysis,
        sheet_name: "Policy Analysis",
        fields: POLICY_ANALYSIS_FIELDS,
        rules: TemplateRules::NONE,
    },
];

/// Look up a schema by caller-supplied template identifier.
///
/// Accepts the canonical id, the display name or the template number.
pub fn get_schema(template_id: &str) -> Result<&'static TemplateSchema, UnknownTemplateError> {
    template_id.parse::<TemplateId>().map(TemplateId::schema)
}

/// All nine schemas in template order.
pub fn all_schemas() -> impl Iterator<Item = &'static TemplateSchema> {
    TEMPLATES.iter()
}
