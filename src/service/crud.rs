//! In-memory entry store and the CRUD operations the REST handlers run against it.

use crate::error::BackendError;
use crate::record::{format_timestamp, Payload};
use crate::schema::ResourceSchema;
use crate::service::timestamp::{normalize, Normalized};
use crate::service::PayloadValidator;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const DEFAULT_LIMIT: u32 = 200;
pub const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Debug)]
struct StoredEntry {
    user_id: i64,
    recorded_at: DateTime<Utc>,
    local_date: NaiveDate,
    timezone: String,
    fields: Payload,
}

impl StoredEntry {
    fn to_json(&self, id: i64) -> Value {
        let mut row = self.fields.clone();
        row.insert("id".into(), Value::from(id));
        row.insert("user_id".into(), Value::from(self.user_id));
        row.insert("recorded_at".into(), Value::String(format_timestamp(&self.recorded_at)));
        row.insert(
            "local_date".into(),
            Value::String(self.local_date.format("%Y-%m-%d").to_string()),
        );
        row.insert("timezone".into(), Value::String(self.timezone.clone()));
        Value::Object(row)
    }

    fn apply(&mut self, normalized: Normalized) {
        self.recorded_at = normalized.recorded_at;
        self.local_date = normalized.local_date;
        self.timezone = normalized.timezone;
    }
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, StoredEntry>,
}

/// Rows per resource; ids are assigned per resource starting at 1.
#[derive(Default)]
pub struct EntryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        self.tables.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        self.tables.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Number of rows stored for `resource`, across users.
    pub fn count(&self, resource: &str) -> usize {
        self.read().get(resource).map(|t| t.rows.len()).unwrap_or(0)
    }
}

/// Filters for listing; `limit` already range-checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

pub struct CrudService;

impl CrudService {
    /// The user's rows, newest local date first, ties broken by id descending.
    pub fn list(store: &EntryStore, schema: &ResourceSchema, user_id: i64, query: &ListQuery) -> Vec<Value> {
        let tables = store.read();
        let Some(table) = tables.get(&schema.resource) else {
            return Vec::new();
        };
        let mut rows: Vec<(&i64, &StoredEntry)> = table
            .rows
            .iter()
            .filter(|(_, e)| e.user_id == user_id)
            .filter(|(_, e)| query.start_date.map_or(true, |d| e.local_date >= d))
            .filter(|(_, e)| query.end_date.map_or(true, |d| e.local_date <= d))
            .collect();
        rows.sort_by(|a, b| b.1.local_date.cmp(&a.1.local_date).then(b.0.cmp(a.0)));
        rows.into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|(id, e)| e.to_json(*id))
            .collect()
    }

    pub fn create(
        store: &EntryStore,
        schema: &ResourceSchema,
        user_id: i64,
        body: &Payload,
        now: DateTime<Utc>,
    ) -> Result<Value, BackendError> {
        let mut fields = PayloadValidator::validate(schema, body)?;
        let recorded_at = take_string(&mut fields, "recorded_at");
        let timezone = take_string(&mut fields, "timezone").unwrap_or_else(|| "UTC".to_string());
        let normalized = normalize(recorded_at.as_deref(), &timezone, now)?;

        let entry = StoredEntry {
            user_id,
            recorded_at: normalized.recorded_at,
            local_date: normalized.local_date,
            timezone: normalized.timezone,
            fields,
        };
        let mut tables = store.write();
        let table = tables.entry(schema.resource.clone()).or_default();
        table.last_id += 1;
        let id = table.last_id;
        let row = entry.to_json(id);
        table.rows.insert(id, entry);
        tracing::debug!(resource = %schema.resource, id, user_id, "entry stored");
        Ok(row)
    }

    /// Apply the present keys of `body`. A changed `recorded_at` or `timezone` renormalizes
    /// the timestamp using the stored value for whichever one is absent.
    pub fn update(
        store: &EntryStore,
        schema: &ResourceSchema,
        user_id: i64,
        id: i64,
        body: &Payload,
        now: DateTime<Utc>,
    ) -> Result<Value, BackendError> {
        let mut fields = PayloadValidator::validate_partial(schema, body)?;
        let recorded_at = take_string(&mut fields, "recorded_at");
        let timezone = take_string(&mut fields, "timezone");

        let mut tables = store.write();
        let entry = tables
            .get_mut(&schema.resource)
            .and_then(|t| t.rows.get_mut(&id))
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| not_found(schema))?;

        if recorded_at.is_some() || timezone.is_some() {
            let stored = format_timestamp(&entry.recorded_at);
            let normalized = normalize(
                Some(recorded_at.as_deref().unwrap_or(&stored)),
                timezone.as_deref().unwrap_or(&entry.timezone),
                now,
            )?;
            entry.apply(normalized);
        }
        entry.fields.extend(fields);
        tracing::debug!(resource = %schema.resource, id, "entry updated");
        Ok(entry.to_json(id))
    }

    pub fn delete(store: &EntryStore, schema: &ResourceSchema, user_id: i64, id: i64) -> Result<(), BackendError> {
        let mut tables = store.write();
        let table = tables.get_mut(&schema.resource).ok_or_else(|| not_found(schema))?;
        match table.rows.get(&id) {
            Some(e) if e.user_id == user_id => {
                table.rows.remove(&id);
                tracing::debug!(resource = %schema.resource, id, "entry deleted");
                Ok(())
            }
            _ => Err(not_found(schema)),
        }
    }
}

fn take_string(fields: &mut Payload, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn not_found(schema: &ResourceSchema) -> BackendError {
    BackendError::NotFound(format!("{} entry not found", schema.title))
}
