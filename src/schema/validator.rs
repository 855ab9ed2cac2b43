//! Schema validation: field uniqueness, choice lists, numeric constraints.

use crate::error::ConfigError;
use crate::schema::{FieldKind, ResourceSchema};
use std::collections::HashSet;

/// Record keys owned by the server; schema fields may not reuse them.
pub const RESERVED_FIELD_NAMES: &[&str] = &["id", "recorded_at", "local_date", "timezone", "user_id"];

pub fn validate(schema: &ResourceSchema) -> Result<(), ConfigError> {
    if schema.resource.trim().is_empty() || schema.resource.contains('/') {
        return Err(ConfigError::Validation(format!(
            "invalid resource name '{}'",
            schema.resource
        )));
    }

    let mut names = HashSet::new();
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "empty field name in resource '{}'",
                schema.resource
            )));
        }
        if RESERVED_FIELD_NAMES.contains(&field.name.as_str()) {
            return Err(ConfigError::ReservedName {
                field: field.name.clone(),
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                resource: schema.resource.clone(),
                field: field.name.clone(),
            });
        }

        if field.kind.is_choice() {
            let choices = field.choices();
            if choices.is_empty() {
                return Err(ConfigError::MissingChoices {
                    resource: schema.resource.clone(),
                    field: field.name.clone(),
                });
            }
            let mut values = HashSet::new();
            for c in choices {
                if !values.insert(c.value.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "{}: duplicate choice value '{}'",
                        field.name, c.value
                    )));
                }
            }
        } else if field.choices.is_some() {
            return Err(ConfigError::Validation(format!(
                "{}: choices are only allowed on choice fields",
                field.name
            )));
        }

        if !field.kind.is_numeric()
            && (field.min.is_some() || field.max.is_some() || field.step.is_some())
        {
            return Err(ConfigError::Validation(format!(
                "{}: min/max/step are only allowed on numeric fields",
                field.name
            )));
        }
        if let (Some(min), Some(max)) = (field.min, field.max) {
            if min > max {
                return Err(ConfigError::Validation(format!(
                    "{}: min {} is greater than max {}",
                    field.name, min, max
                )));
            }
        }
        if let Some(step) = field.step {
            if step <= 0.0 || !step.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{}: step must be positive",
                    field.name
                )));
            }
        }
        if field.empty_selection.is_some() && field.kind != FieldKind::MultiChoice {
            return Err(ConfigError::Validation(format!(
                "{}: empty selection only applies to multi-choice fields",
                field.name
            )));
        }
    }

    Ok(())
}
