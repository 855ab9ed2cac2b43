//! Request payload validation against a resource schema.

use crate::error::BackendError;
use crate::field_errors::{LocSegment, ValidationItem};
use crate::record::Payload;
use crate::schema::{FieldKind, FieldSchema, ResourceSchema, ValueEncoding};
use crate::service::timestamp::TIMEZONE_MAX_LEN;
use serde_json::{Number, Value};

pub struct PayloadValidator;

impl PayloadValidator {
    /// Validate a create body. Every required field must be present and non-null; missing
    /// optional fields become `null`. Unknown keys are dropped.
    pub fn validate(schema: &ResourceSchema, body: &Payload) -> Result<Payload, BackendError> {
        Self::run(schema, body, false)
    }

    /// Validate only the keys present in an update body.
    pub fn validate_partial(schema: &ResourceSchema, body: &Payload) -> Result<Payload, BackendError> {
        Self::run(schema, body, true)
    }

    fn run(schema: &ResourceSchema, body: &Payload, partial: bool) -> Result<Payload, BackendError> {
        let mut items = Vec::new();
        let mut out = Payload::new();

        for key in ["recorded_at", "timezone"] {
            match body.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => {
                    if key == "timezone" && s.chars().count() > TIMEZONE_MAX_LEN {
                        items.push(ValidationItem::body(
                            key,
                            format!("String should have at most {} characters", TIMEZONE_MAX_LEN),
                            "string_too_long",
                        ));
                    } else {
                        out.insert(key.to_string(), Value::String(s.clone()));
                    }
                }
                Some(_) => items.push(ValidationItem::body(key, "Input should be a valid string", "string_type")),
            }
        }

        for field in &schema.fields {
            match body.get(&field.name) {
                None if partial => {}
                None if field.optional => {
                    out.insert(field.name.clone(), Value::Null);
                }
                None => items.push(ValidationItem::body(&field.name, "Field required", "missing")),
                Some(value) => match check_field(field, value) {
                    Ok(v) => {
                        out.insert(field.name.clone(), v);
                    }
                    Err(mut errs) => items.append(&mut errs),
                },
            }
        }

        if items.is_empty() {
            Ok(out)
        } else {
            tracing::debug!(resource = %schema.resource, errors = items.len(), "payload rejected");
            Err(BackendError::Validation(items))
        }
    }
}

fn check_field(field: &FieldSchema, value: &Value) -> Result<Value, Vec<ValidationItem>> {
    let fail = |msg: String, kind: &str| vec![ValidationItem::body(&field.name, msg, kind)];

    if value.is_null() {
        return if field.optional {
            Ok(Value::Null)
        } else {
            Err(fail(type_message(field).to_string(), type_code(field)))
        };
    }

    match field.kind {
        FieldKind::Decimal => {
            let n = as_f64(value).map_err(|(m, k)| fail(m.to_string(), k))?;
            check_bounds(field, n).map_err(|(m, k)| fail(m, k))?;
            Ok(Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null))
        }
        FieldKind::Integer => {
            let n = as_i64(value).map_err(|(m, k)| fail(m.to_string(), k))?;
            check_bounds(field, n as f64).map_err(|(m, k)| fail(m, k))?;
            Ok(Value::from(n))
        }
        FieldKind::Text => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            _ => Err(fail("Input should be a valid string".into(), "string_type")),
        },
        FieldKind::SingleChoice => match field.encoding() {
            ValueEncoding::String => {
                let known = value
                    .as_str()
                    .map(|s| field.choices().iter().any(|c| c.value == s))
                    .unwrap_or(false);
                if known {
                    Ok(value.clone())
                } else {
                    Err(fail(literal_message(field), "literal_error"))
                }
            }
            _ => as_i64(value)
                .map(Value::from)
                .map_err(|(m, k)| fail(m.to_string(), k)),
        },
        FieldKind::MultiChoice => {
            let items = value
                .as_array()
                .ok_or_else(|| fail("Input should be a valid list".into(), "list_type"))?;
            let mut out = Vec::with_capacity(items.len());
            let mut errors = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let checked = match field.encoding() {
                    ValueEncoding::String => item
                        .as_str()
                        .map(|s| Value::String(s.to_string()))
                        .ok_or(("Input should be a valid string", "string_type")),
                    _ => as_i64(item).map(Value::from),
                };
                match checked {
                    Ok(v) => out.push(v),
                    Err((msg, kind)) => errors.push(ValidationItem::new(
                        vec!["body".into(), field.name.as_str().into(), LocSegment::from(i)],
                        msg,
                        kind,
                    )),
                }
            }
            if errors.is_empty() {
                Ok(Value::Array(out))
            } else {
                Err(errors)
            }
        }
    }
}

fn as_f64(value: &Value) -> Result<f64, (&'static str, &'static str)> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(("Input should be a valid number", "float_type")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(("Input should be a valid number, unable to parse string as a number", "float_parsing")),
        _ => Err(("Input should be a valid number", "float_type")),
    }
}

fn as_i64(value: &Value) -> Result<i64, (&'static str, &'static str)> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                Some(_) => Err((
                    "Input should be a valid integer, got a number with a fractional part",
                    "int_from_float",
                )),
                None => Err(("Input should be a valid integer", "int_type")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ("Input should be a valid integer, unable to parse string as an integer", "int_parsing")),
        _ => Err(("Input should be a valid integer", "int_type")),
    }
}

fn check_bounds(field: &FieldSchema, n: f64) -> Result<(), (String, &'static str)> {
    if let Some(min) = field.min {
        if n < min {
            return Err((format!("Input should be greater than or equal to {}", min), "greater_than_equal"));
        }
    }
    if let Some(max) = field.max {
        if n > max {
            return Err((format!("Input should be less than or equal to {}", max), "less_than_equal"));
        }
    }
    Ok(())
}

fn type_message(field: &FieldSchema) -> &'static str {
    match field.kind {
        FieldKind::Decimal => "Input should be a valid number",
        FieldKind::Integer => "Input should be a valid integer",
        FieldKind::MultiChoice => "Input should be a valid list",
        FieldKind::SingleChoice if field.encoding() != ValueEncoding::String => "Input should be a valid integer",
        FieldKind::Text | FieldKind::SingleChoice => "Input should be a valid string",
    }
}

fn type_code(field: &FieldSchema) -> &'static str {
    match field.kind {
        FieldKind::Decimal => "float_type",
        FieldKind::Integer => "int_type",
        FieldKind::MultiChoice => "list_type",
        FieldKind::SingleChoice if field.encoding() != ValueEncoding::String => "int_type",
        FieldKind::Text | FieldKind::SingleChoice => "string_type",
    }
}

/// `Input should be 'a', 'b' or 'c'`
fn literal_message(field: &FieldSchema) -> String {
    let quoted: Vec<String> = field.choices().iter().map(|c| format!("'{}'", c.value)).collect();
    match quoted.split_last() {
        None => "Input should be a valid string".to_string(),
        Some((last, [])) => format!("Input should be {}", last),
        Some((last, rest)) => format!("Input should be {} or {}", rest.join(", "), last),
    }
}
