//! Validation error mapping: structured 422 failures to per-field messages.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One segment of a validation location, e.g. `"body"`, `"email"` or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(u64),
    Key(String),
}

impl LocSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            LocSegment::Key(s) => Some(s.as_str()),
            LocSegment::Index(_) => None,
        }
    }
}

impl From<&str> for LocSegment {
    fn from(s: &str) -> Self {
        LocSegment::Key(s.to_string())
    }
}

impl From<usize> for LocSegment {
    fn from(i: usize) -> Self {
        LocSegment::Index(i as u64)
    }
}

/// `{ loc, msg, type }` as produced by the backend's input-validation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationItem {
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    #[serde(default)]
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ValidationItem {
    pub fn new(loc: Vec<LocSegment>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Item located in the request body at `field`.
    pub fn body(field: &str, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(vec!["body".into(), field.into()], msg, kind)
    }

    /// Field name this item points at: the last `loc` segment, when it is a non-empty key.
    pub fn field(&self) -> Option<&str> {
        self.loc
            .last()
            .and_then(LocSegment::as_key)
            .filter(|s| !s.is_empty())
    }
}

/// Body of a structured validation failure: `{ "detail": [ ... ] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub detail: Vec<ValidationItem>,
}

impl ValidationFailure {
    /// Lossy `field -> message` view. Items without a usable field name are dropped;
    /// a later item for the same field overwrites an earlier one.
    pub fn field_errors(&self) -> FieldErrors {
        let mut out = FieldErrors::default();
        for item in &self.detail {
            if let Some(field) = item.field() {
                out.insert(field, item.msg.clone());
            }
        }
        out
    }

    pub fn first_message(&self) -> Option<&str> {
        self.detail.first().map(|i| i.msg.as_str())
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_message() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "no details"),
        }
    }
}

/// Field name -> message. Rebuilt on every submit attempt; cleared per field on edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = FieldErrors::default();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

/// Per-field messages carried by a failed call. Empty unless the failure was a structured 422.
pub fn parse_validation_errors(err: &ApiError) -> FieldErrors {
    match err {
        ApiError::Validation(failure) => failure.field_errors(),
        _ => FieldErrors::default(),
    }
}

/// Single combined message for any failure: first structured message, then the body's
/// `detail`/`message`, then the transport-level text.
pub fn error_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation(failure) => failure
            .first_message()
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string()),
        ApiError::Unauthorized(body) | ApiError::Status { body, .. } => {
            body.summary().unwrap_or_else(|| err.to_string())
        }
        ApiError::Transport(e) => e.to_string(),
        ApiError::Decode(e) => e.to_string(),
    }
}
