//! Multi-choice selections and their stored/submitted representations.

use crate::schema::ValueEncoding;
use serde_json::Value;

/// Ordered set of selected choice values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Selection::default();
        for v in values {
            out.insert(v.into());
        }
        out
    }

    /// Parse the form's comma-joined representation.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Decode a stored record value: an array, a comma-joined string, a single scalar or `null`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Selection::default(),
            Value::Array(items) => Self::new(items.iter().filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })),
            Value::String(s) => Self::parse(s),
            other => Self::new([other.to_string()]),
        }
    }

    fn insert(&mut self, value: String) {
        if !value.is_empty() && !self.0.contains(&value) {
            self.0.push(value);
        }
    }

    pub fn toggle(&mut self, value: &str, selected: bool) {
        if selected {
            self.insert(value.to_string());
        } else {
            self.0.retain(|v| v != value);
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn to_raw(&self) -> String {
        self.0.join(",")
    }

    /// Submit representation. Numeric encodings drop values that are not integers.
    pub fn encode(&self, encoding: ValueEncoding) -> Vec<Value> {
        match encoding {
            ValueEncoding::String => self.0.iter().cloned().map(Value::String).collect(),
            ValueEncoding::Number | ValueEncoding::NumberArray => self
                .0
                .iter()
                .filter_map(|s| s.parse::<i64>().ok())
                .map(Value::from)
                .collect(),
        }
    }
}
