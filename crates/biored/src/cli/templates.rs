//! Templates command - list templates or show one template's fields

use anyhow::Result;
use biored_schema::{all_schemas, get_schema, FieldFlag, TemplateSchema};
use serde::Serialize;

use crate::cli::error::HelpfulError;
use crate::cli::output::{print_json, print_table};

/// Arguments for the `templates` command
#[derive(Debug)]
pub struct TemplatesArgs {
    pub id: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TemplateListing {
    id: String,
    number: u8,
    name: &'static str,
    sheet: &'static str,
    fields: usize,
    required: usize,
}

pub fn run(args: TemplatesArgs) -> Result<()> {
    match args.id {
        Some(raw) => {
            let schema = get_schema(&raw).map_err(|_| HelpfulError::unknown_template(&raw))?;
            if args.json {
                print_json(schema)
            } else {
                print_fields(schema);
                Ok(())
            }
        }
        None => {
            let listings: Vec<TemplateListing> = all_schemas().map(listing).collect();
            if args.json {
                print_json(&listings)
            } else {
                print_listings(&listings);
                Ok(())
            }
        }
    }
}

fn listing(schema: &'static TemplateSchema) -> TemplateListing {
    TemplateListing {
        id: schema.id.to_string(),
        number: schema.id.number(),
        name: schema.id.display_name(),
        sheet: schema.sheet_name,
        fields: schema.fields.len(),
        required: schema.required_fields().count(),
    }
}

fn print_listings(listings: &[TemplateListing]) {
    let rows = listings
        .iter()
        .map(|l| {
            vec![
                l.number.to_string(),
                l.id.clone(),
                l.sheet.to_string(),
                l.fields.to_string(),
                l.required.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "ID", "SHEET", "FIELDS", "REQUIRED"], rows);
}

fn print_fields(schema: &TemplateSchema) {
    println!(
        "{} ({}), sheet '{}'",
        schema.id,
        schema.id.display_name(),
        schema.sheet_name
    );

    let rows = schema
        .fields
        .iter()
        .map(|field| {
            let mut notes = Vec::new();
            if field.has_flag(FieldFlag::PrimaryId) {
                notes.push("primary id".to_string());
            }
            if field.has_flag(FieldFlag::EnhancementMarker) {
                notes.push("enhancement marker".to_string());
            }
            if let Some(values) = field.field_type.allowed_values() {
                notes.push(values.join(", "));
            }
            vec![
                field.name.to_string(),
                field.field_type.to_string(),
                if field.required { "yes" } else { "" }.to_string(),
                notes.join("; "),
            ]
        })
        .collect();
    print_table(&["FIELD", "TYPE", "REQUIRED", "NOTES"], rows);

    if let Some(targets) = schema.rules.enhancement {
        println!(
            "Enhancement targets: at least {} enhanced and {} new rows, {} optional fields per enhanced row",
            targets.min_enhanced, targets.min_new, targets.min_fields_per_enhanced
        );
    }
    for rule in schema.rules.conditional {
        println!(
            "Conditional: {} required when {} is '{}'",
            rule.then_required, rule.when_field, rule.equals
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biored_schema::TemplateId;

    #[test]
    fn test_listing_counts() {
        let l = listing(TemplateId::FundingSources.schema());
        assert_eq!(l.id, "4_Funding_Sources");
        assert_eq!(l.number, 4);
        assert!(l.required > 0 && l.required <= l.fields);
    }
}
