//! Invariants every template in the registry must satisfy.

use biored_schema::{
    all_schemas, get_schema, normalize_name, FieldFlag, TemplateId, UnknownTemplateError,
};
use std::collections::HashSet;

#[test]
fn test_registry_has_nine_templates() {
    assert_eq!(all_schemas().count(), 9);
    let ids: HashSet<TemplateId> = all_schemas().map(|s| s.id).collect();
    assert_eq!(ids.len(), 9);
}

#[test]
fn test_field_names_unique_per_schema() {
    for schema in all_schemas() {
        let mut seen = HashSet::new();
        for field in schema.fields {
            assert!(
                seen.insert(normalize_name(field.name)),
                "{}: duplicate field {}",
                schema.id,
                field.name
            );
        }
    }
}

#[test]
fn test_enum_fields_carry_values() {
    for schema in all_schemas() {
        for (field, values) in schema.enum_fields() {
            assert!(!values.is_empty(), "{}: {} has no values", schema.id, field.name);
            assert!(
                values.iter().all(|v| !v.trim().is_empty()),
                "{}: {} has a blank allowed value",
                schema.id,
                field.name
            );
        }
    }
}

#[test]
fn test_every_template_has_required_fields() {
    for schema in all_schemas() {
        assert!(schema.required_fields().count() > 0, "{}", schema.id);
    }
}

#[test]
fn test_primary_ids_are_required() {
    for schema in all_schemas() {
        if let Some(field) = schema.flagged(FieldFlag::PrimaryId) {
            assert!(field.required, "{}: {}", schema.id, field.name);
        }
    }
}

#[test]
fn test_rules_reference_known_fields() {
    for schema in all_schemas() {
        for rule in schema.rules.conditional {
            assert!(schema.field(rule.when_field).is_some(), "{}", rule.when_field);
            assert!(schema.field(rule.then_required).is_some(), "{}", rule.then_required);
        }
        if schema.rules.enhancement.is_some() {
            assert!(schema.flagged(FieldFlag::EnhancementMarker).is_some());
        }
    }
}

#[test]
fn test_only_organization_registry_has_rules() {
    for schema in all_schemas() {
        assert_eq!(
            !schema.rules.is_empty(),
            schema.id == TemplateId::OrganizationRegistry,
            "{}",
            schema.id
        );
    }
}

#[test]
fn test_get_schema() {
    let schema = get_schema("4_Funding_Sources").unwrap();
    assert_eq!(schema.id, TemplateId::FundingSources);
    assert_eq!(schema.sheet_name, "Funding Sources");
    assert!(schema.field("Funding Type").is_some());

    let err = get_schema("Budget Plan").unwrap_err();
    assert_eq!(err, UnknownTemplateError("Budget Plan".to_string()));
    assert_eq!(err.to_string(), "unknown template 'Budget Plan'");
}

#[test]
fn test_schema_serializes() {
    let json = serde_json::to_value(TemplateId::OrganizationRegistry.schema()).unwrap();
    assert_eq!(json["id"], "1_Organization_Registry");
    assert_eq!(json["fields"][0]["name"], "Organization_ID");
    assert_eq!(json["fields"][0]["flags"][0], "primary_id");
    assert_eq!(json["rules"]["enhancement"]["min_enhanced"], 30);
}
