//! Editable form state for one resource: raw input strings, edit target and field errors.

use crate::field_errors::FieldErrors;
use crate::form::Selection;
use crate::record::EntryRecord;
use crate::schema::{FieldKind, ResourceSchema};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_TIME: &str = "08:00";
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    editing: Option<i64>,
    date: String,
    time: String,
    timezone: String,
    values: BTreeMap<String, String>,
    errors: FieldErrors,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            editing: None,
            date: String::new(),
            time: DEFAULT_TIME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            values: BTreeMap::new(),
            errors: FieldErrors::default(),
        }
    }
}

impl FormState {
    /// Empty create-mode form, optionally pre-filled with a `YYYY-MM-DD` date.
    pub fn new(initial_date: Option<&str>) -> Self {
        let mut form = Self::default();
        if let Some(d) = initial_date {
            form.date = d.to_string();
        }
        form
    }

    /// Back to empty create mode.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Populate the form from a stored record. The date and time come from `recorded_at`
    /// in UTC; records without one fall back to their local date.
    pub fn begin_edit(&mut self, record: &EntryRecord, schema: &ResourceSchema) {
        self.editing = Some(record.id);
        match record.recorded_at {
            Some(t) => {
                self.date = t.format("%Y-%m-%d").to_string();
                self.time = t.format("%H:%M").to_string();
            }
            None => {
                self.date = record
                    .local_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
            }
        }
        self.timezone = record
            .timezone
            .clone()
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        self.values.clear();
        for field in &schema.fields {
            let value = record.field(&field.name).unwrap_or(&Value::Null);
            let raw = match field.kind {
                FieldKind::MultiChoice => Selection::from_value(value).to_raw(),
                _ => editable_string(value),
            };
            self.values.insert(field.name.clone(), raw);
        }
        self.errors = FieldErrors::default();
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn set_date(&mut self, date: &str) {
        self.date = date.to_string();
        self.errors.clear("recorded_at");
    }

    pub fn set_time(&mut self, time: &str) {
        self.time = time.to_string();
    }

    pub fn set_timezone(&mut self, timezone: &str) {
        self.timezone = timezone.to_string();
        self.errors.clear("timezone");
    }

    /// Raw input of a field; empty when untouched.
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, field: &str, value: &str) {
        self.values.insert(field.to_string(), value.to_string());
        self.errors.clear(field);
    }

    pub fn selection(&self, field: &str) -> Selection {
        Selection::parse(self.value(field))
    }

    /// Check or uncheck one option of a multi-choice field.
    pub fn toggle_choice(&mut self, field: &str, choice: &str, selected: bool) {
        let mut s = self.selection(field);
        s.toggle(choice, selected);
        self.set_value(field, &s.to_raw());
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }
}

fn editable_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
