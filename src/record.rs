//! Entry records as returned by the REST resource API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Submit body: field name -> JSON value.
pub type Payload = Map<String, Value>;

/// A stored entry. Server-owned metadata is typed; schema-defined fields stay in `fields`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub local_date: Option<NaiveDate>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntryRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value of a table column, metadata included.
    pub fn column(&self, name: &str) -> Value {
        match name {
            "id" => Value::from(self.id),
            "recorded_at" => self
                .recorded_at
                .map(|t| Value::String(format_timestamp(&t)))
                .unwrap_or(Value::Null),
            "local_date" => self
                .local_date
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            "timezone" => self.timezone.clone().map(Value::String).unwrap_or(Value::Null),
            "user_id" => self.user_id.map(Value::from).unwrap_or(Value::Null),
            other => self.fields.get(other).cloned().unwrap_or(Value::Null),
        }
    }

    /// Convert into the typed record of a resource.
    pub fn to_typed<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

/// RFC 3339 UTC with millisecond precision, e.g. `2024-03-01T08:30:00.000Z`.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse an RFC 3339 timestamp; a naive ISO timestamp is taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|n| n.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
    }
}

/// Table cell text: `null` is empty, arrays are comma-joined, strings unquoted.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
