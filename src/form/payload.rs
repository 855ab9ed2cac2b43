//! Input-level constraint checks and coercion of raw form strings into a submit payload.

use crate::field_errors::FieldErrors;
use crate::form::{FormState, Selection};
use crate::record::{format_timestamp, Payload};
use crate::schema::{EmptySelection, FieldKind, FieldSchema, ResourceSchema, ValueEncoding};
use chrono::{NaiveDate, NaiveTime};
use serde_json::{Number, Value};

/// Checks a browser enforces before letting a form submit: parseable numbers, `min`/`max`/`step`,
/// required numeric inputs, known single-choice values, well-formed date and time.
pub fn check_constraints(schema: &ResourceSchema, form: &FormState) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if !form.date().is_empty() {
        if parse_date(form.date()).is_none() {
            errors.insert("recorded_at", "Please enter a valid date.");
        } else if !form.time().is_empty() && parse_time(form.time()).is_none() {
            errors.insert("recorded_at", "Please enter a valid time.");
        }
    }

    for field in &schema.fields {
        let raw = form.value(&field.name).trim();
        if let Some(msg) = field_constraint(field, raw) {
            errors.insert(field.name.as_str(), msg);
        }
    }
    errors
}

fn field_constraint(field: &FieldSchema, raw: &str) -> Option<String> {
    match field.kind {
        FieldKind::Decimal | FieldKind::Integer => {
            if raw.is_empty() {
                return (!field.optional).then(|| "Please fill out this field.".to_string());
            }
            let n: f64 = match raw.parse() {
                Ok(n) if f64::is_finite(n) => n,
                _ => return Some("Please enter a number.".to_string()),
            };
            if field.kind == FieldKind::Integer && raw.parse::<i64>().is_err() {
                return Some("Please enter a whole number.".to_string());
            }
            if let Some(min) = field.min {
                if n < min {
                    return Some(format!("Value must be greater than or equal to {}.", min));
                }
            }
            if let Some(max) = field.max {
                if n > max {
                    return Some(format!("Value must be less than or equal to {}.", max));
                }
            }
            field.step.and_then(|step| step_mismatch(field, n, step))
        }
        FieldKind::SingleChoice => {
            if raw.is_empty() || field.choices().iter().any(|c| c.value == raw) {
                None
            } else {
                Some("Please select a valid option.".to_string())
            }
        }
        FieldKind::Text | FieldKind::MultiChoice => None,
    }
}

/// Values must sit on `min + k * step`, counting from 0 without a `min`.
fn step_mismatch(field: &FieldSchema, n: f64, step: f64) -> Option<String> {
    let base = field.min.unwrap_or(0.0);
    let k = (n - base) / step;
    if (k - k.round()).abs() < 1e-9 {
        return None;
    }
    let lower = tidy(base + k.floor() * step);
    let upper = tidy(lower + step);
    if field.max.map_or(false, |max| upper > max) {
        return Some(format!("Please enter a valid value. The nearest valid value is {}.", lower));
    }
    Some(format!(
        "Please enter a valid value. The two nearest valid values are {} and {}.",
        lower, upper
    ))
}

fn tidy(n: f64) -> f64 {
    (n * 1e9).round() / 1e9
}

/// Coerce one raw input to the value submitted for `field`.
pub fn coerce_field(field: &FieldSchema, raw: &str) -> Value {
    match field.kind {
        FieldKind::MultiChoice => {
            let ids = Selection::parse(raw).encode(field.encoding());
            if ids.is_empty() {
                match field.empty_selection() {
                    EmptySelection::Null => Value::Null,
                    EmptySelection::EmptyList => Value::Array(Vec::new()),
                }
            } else {
                Value::Array(ids)
            }
        }
        FieldKind::SingleChoice => {
            let raw = raw.trim();
            let value = if raw.is_empty() {
                field.choices().first().map(|c| c.value.as_str()).unwrap_or("")
            } else {
                raw
            };
            if value.is_empty() {
                return Value::Null;
            }
            match field.encoding() {
                ValueEncoding::Number | ValueEncoding::NumberArray => value
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                ValueEncoding::String => Value::String(value.to_string()),
            }
        }
        FieldKind::Text => {
            if raw.is_empty() {
                Value::Null
            } else {
                Value::String(raw.to_string())
            }
        }
        FieldKind::Integer => {
            let raw = raw.trim();
            if raw.is_empty() {
                return if field.optional { Value::Null } else { Value::from(0) };
            }
            raw.parse::<i64>().map(Value::from).unwrap_or(Value::Null)
        }
        FieldKind::Decimal => {
            let raw = raw.trim();
            if raw.is_empty() {
                return if field.optional { Value::Null } else { Value::from(0) };
            }
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
    }
}

/// Build the create/update body: `timezone`, `recorded_at` when a date is set, then every
/// schema field. Constraint violations are returned instead of a payload.
pub fn build_payload(schema: &ResourceSchema, form: &FormState) -> Result<Payload, FieldErrors> {
    let errors = check_constraints(schema, form);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut payload = Payload::new();
    payload.insert("timezone".into(), Value::String(form.timezone().to_string()));
    if let Some(date) = parse_date(form.date()) {
        let time = parse_time(form.time()).unwrap_or_default();
        let recorded = date.and_time(time).and_utc();
        payload.insert("recorded_at".into(), Value::String(format_timestamp(&recorded)));
    }
    for field in &schema.fields {
        payload.insert(field.name.clone(), coerce_field(field, form.value(&field.name)));
    }
    Ok(payload)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Choice;
    use serde_json::json;

    fn health() -> ResourceSchema {
        ResourceSchema::new(
            "health",
            "Health",
            vec![
                FieldSchema::single_choice(
                    "entry_type",
                    "Type",
                    vec![Choice::new("day", "Day"), Choice::new("morning", "Morning")],
                )
                .optional(),
                FieldSchema::decimal("sleep_hours", "Sleep").min(0.0).max(24.0),
                FieldSchema::integer("energy_level", "Energy").min(1.0).max(10.0),
                FieldSchema::decimal("weight_kg", "Weight").optional(),
                FieldSchema::integer("steps", "Steps").optional(),
                FieldSchema::text("notes", "Notes").optional(),
            ],
        )
    }

    fn filled() -> FormState {
        let mut form = FormState::default();
        form.set_value("sleep_hours", "7.5");
        form.set_value("energy_level", "6");
        form
    }

    #[test]
    fn every_field_is_present_and_blank_optionals_are_null() {
        let schema = health();
        let payload = build_payload(&schema, &filled()).unwrap();
        for field in &schema.fields {
            assert!(payload.contains_key(&field.name), "missing {}", field.name);
        }
        assert_eq!(payload["sleep_hours"], json!(7.5));
        assert_eq!(payload["energy_level"], json!(6));
        assert_eq!(payload["weight_kg"], Value::Null);
        assert_eq!(payload["steps"], Value::Null);
        assert_eq!(payload["notes"], Value::Null);
        assert_eq!(payload["timezone"], json!("UTC"));
        assert!(!payload.contains_key("recorded_at"));
    }

    #[test]
    fn blank_optional_number_is_null_not_zero() {
        let field = FieldSchema::decimal("weight_kg", "Weight").optional();
        assert_eq!(coerce_field(&field, ""), Value::Null);
        assert_eq!(coerce_field(&field, "  "), Value::Null);
        assert_eq!(coerce_field(&field, "70.2"), json!(70.2));
    }

    #[test]
    fn combines_date_and_time_into_utc_timestamp() {
        let mut form = filled();
        form.set_date("2024-03-01");
        form.set_time("21:45");
        let payload = build_payload(&health(), &form).unwrap();
        assert_eq!(payload["recorded_at"], json!("2024-03-01T21:45:00.000Z"));

        form.set_time("");
        let payload = build_payload(&health(), &form).unwrap();
        assert_eq!(payload["recorded_at"], json!("2024-03-01T00:00:00.000Z"));
    }

    #[test]
    fn empty_single_choice_falls_back_to_first_choice() {
        let schema = health();
        let payload = build_payload(&schema, &filled()).unwrap();
        assert_eq!(payload["entry_type"], json!("day"));

        let course = FieldSchema::single_choice("course_id", "Course", vec![Choice::new("12", "Rust")])
            .optional()
            .encoded_as(ValueEncoding::Number);
        assert_eq!(coerce_field(&course, ""), json!(12));
        assert_eq!(coerce_field(&course, "12"), json!(12));
    }

    #[test]
    fn multi_choice_empty_representation_is_per_field() {
        let choices = vec![Choice::new("1", "A"), Choice::new("2", "B")];
        let required = FieldSchema::multi_choice("ids", "Ids", choices.clone());
        let optional = FieldSchema::multi_choice("ids", "Ids", choices.clone()).optional();
        let optional_list = FieldSchema::multi_choice("ids", "Ids", choices)
            .optional()
            .empty_as(EmptySelection::EmptyList);

        assert_eq!(coerce_field(&required, ""), json!([]));
        assert_eq!(coerce_field(&optional, ""), Value::Null);
        assert_eq!(coerce_field(&optional_list, ""), json!([]));
        assert_eq!(coerce_field(&optional, "2,1"), json!([2, 1]));
    }

    #[test]
    fn text_is_null_when_empty() {
        let field = FieldSchema::text("notes", "Notes").optional();
        assert_eq!(coerce_field(&field, ""), Value::Null);
        assert_eq!(coerce_field(&field, "slept well"), json!("slept well"));
    }

    #[test]
    fn constraint_violations_block_the_payload() {
        let mut form = filled();
        form.set_value("sleep_hours", "25");
        form.set_value("energy_level", "5.5");
        form.set_value("steps", "many");
        form.set_value("entry_type", "night");
        let errors = build_payload(&health(), &form).unwrap_err();
        assert_eq!(errors.get("sleep_hours"), Some("Value must be less than or equal to 24."));
        assert_eq!(errors.get("energy_level"), Some("Please enter a whole number."));
        assert_eq!(errors.get("steps"), Some("Please enter a number."));
        assert_eq!(errors.get("entry_type"), Some("Please select a valid option."));
    }

    #[test]
    fn declared_step_counts_from_min() {
        let odd = ResourceSchema::new(
            "odd",
            "Odd",
            vec![
                FieldSchema::integer("level", "Level").min(1.0).max(10.0).step(2.0),
                FieldSchema::decimal("hours", "Hours").step(0.1).optional(),
                FieldSchema::decimal("free", "Free").optional(),
            ],
        );
        let mut form = FormState::default();
        form.set_value("level", "5");
        form.set_value("hours", "7.3");
        form.set_value("free", "7.55");
        assert!(check_constraints(&odd, &form).is_empty());

        form.set_value("level", "4");
        form.set_value("hours", "7.55");
        let errors = check_constraints(&odd, &form);
        assert_eq!(
            errors.get("level"),
            Some("Please enter a valid value. The two nearest valid values are 3 and 5.")
        );
        assert_eq!(
            errors.get("hours"),
            Some("Please enter a valid value. The two nearest valid values are 7.5 and 7.6.")
        );

        form.set_value("level", "10");
        assert_eq!(
            check_constraints(&odd, &form).get("level"),
            Some("Please enter a valid value. The nearest valid value is 9.")
        );
    }

    #[test]
    fn required_numbers_must_be_filled() {
        let mut form = FormState::default();
        form.set_value("sleep_hours", "8");
        let errors = check_constraints(&health(), &form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("energy_level"), Some("Please fill out this field."));
    }

    #[test]
    fn malformed_date_is_reported_on_recorded_at() {
        let mut form = filled();
        form.set_date("03/01/2024");
        let errors = build_payload(&health(), &form).unwrap_err();
        assert!(errors.get("recorded_at").is_some());
    }
}
