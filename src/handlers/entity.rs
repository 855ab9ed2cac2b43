//! Entry CRUD handlers: list, create, update, delete for any registered resource.

use crate::error::BackendError;
use crate::extractors::CurrentUser;
use crate::field_errors::{LocSegment, ValidationItem};
use crate::record::Payload;
use crate::response;
use crate::schema::ResourceSchema;
use crate::service::{CrudService, ListQuery, MAX_LIMIT};
use crate::state::BackendState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;

fn schema_for<'a>(state: &'a BackendState, resource: &str) -> Result<&'a ResourceSchema, BackendError> {
    state
        .registry
        .get(resource)
        .ok_or_else(|| BackendError::NotFound("Not Found".into()))
}

fn parse_id(id_str: &str) -> Result<i64, BackendError> {
    id_str.parse().map_err(|_| {
        BackendError::Validation(vec![ValidationItem::new(
            vec!["path".into(), "id".into()],
            "Input should be a valid integer, unable to parse string as an integer",
            "int_parsing",
        )])
    })
}

fn body_to_map(value: Value) -> Result<Payload, BackendError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(BackendError::Validation(vec![ValidationItem::new(
            vec![LocSegment::from("body")],
            "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type",
        )])),
    }
}

fn query_item(name: &str, msg: impl Into<String>, kind: &str) -> ValidationItem {
    ValidationItem::new(vec!["query".into(), name.into()], msg, kind)
}

fn list_query(params: &HashMap<String, String>) -> Result<ListQuery, BackendError> {
    let mut query = ListQuery::default();
    let mut items = Vec::new();

    for (key, slot) in [("start_date", &mut query.start_date), ("end_date", &mut query.end_date)] {
        if let Some(v) = params.get(key) {
            match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
                Ok(d) => *slot = Some(d),
                Err(_) => items.push(query_item(
                    key,
                    "Input should be a valid date in the format YYYY-MM-DD",
                    "date_from_datetime_parsing",
                )),
            }
        }
    }
    if let Some(v) = params.get("limit") {
        match v.parse::<i64>() {
            Ok(n) if n < 1 => items.push(query_item("limit", "Input should be greater than or equal to 1", "greater_than_equal")),
            Ok(n) if n > MAX_LIMIT as i64 => items.push(query_item(
                "limit",
                format!("Input should be less than or equal to {}", MAX_LIMIT),
                "less_than_equal",
            )),
            Ok(n) => query.limit = n as u32,
            Err(_) => items.push(query_item(
                "limit",
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            )),
        }
    }
    if let Some(v) = params.get("offset") {
        match v.parse::<u32>() {
            Ok(n) => query.offset = n,
            Err(_) => items.push(query_item("offset", "Input should be greater than or equal to 0", "greater_than_equal")),
        }
    }

    if items.is_empty() {
        Ok(query)
    } else {
        Err(BackendError::Validation(items))
    }
}

pub async fn list(
    State(state): State<BackendState>,
    CurrentUser(user_id): CurrentUser,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, BackendError> {
    let schema = schema_for(&state, &resource)?;
    let query = list_query(&params)?;
    let rows = CrudService::list(&state.store, schema, user_id, &query);
    tracing::debug!(resource = %resource, count = rows.len(), "list entries");
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<BackendState>,
    CurrentUser(user_id): CurrentUser,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, BackendError> {
    let schema = schema_for(&state, &resource)?;
    let body = body_to_map(body)?;
    let row = CrudService::create(&state.store, schema, user_id, &body, Utc::now())?;
    tracing::info!(resource = %resource, id = %row["id"], "entry created");
    Ok((StatusCode::OK, Json(row)))
}

pub async fn update(
    State(state): State<BackendState>,
    CurrentUser(user_id): CurrentUser,
    Path((resource, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, BackendError> {
    let schema = schema_for(&state, &resource)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let row = CrudService::update(&state.store, schema, user_id, id, &body, Utc::now())?;
    tracing::info!(resource = %resource, id, "entry updated");
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<BackendState>,
    CurrentUser(user_id): CurrentUser,
    Path((resource, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, BackendError> {
    let schema = schema_for(&state, &resource)?;
    let id = parse_id(&id_str)?;
    CrudService::delete(&state.store, schema, user_id, id)?;
    tracing::info!(resource = %resource, id, "entry deleted");
    Ok(Json(response::deleted()))
}
