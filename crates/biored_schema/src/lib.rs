//! Template Registry for BIO-RED partner submissions
//!
//! Partners fill in one of nine fixed spreadsheet templates. Each template is
//! a closed, static schema: the set of fields, which are required, what type
//! each cell must hold, and which dropdown values are allowed.
//!
//! The registry is plain `'static` data. It is built at compile time, never
//! mutated, and safe to read from any number of threads.
//!
//! # Modules
//!
//! - [`field`]: Field definitions, types and metadata flags
//! - [`template`]: Template identifiers, schemas and template-specific rules
//! - [`registry`]: The nine template definitions and lookup by name

pub mod field;
pub mod registry;
pub mod template;

pub use field::{normalize_name, FieldDefinition, FieldFlag, FieldType};
pub use registry::{all_schemas, get_schema};
pub use template::{
    ConditionalRequirement, EnhancementTargets, TemplateId, TemplateRules, TemplateSchema,
    UnknownTemplateError,
};
