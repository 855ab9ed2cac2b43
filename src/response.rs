//! Response bodies in the `{"detail": ...}` shape clients parse.

use crate::field_errors::ValidationItem;
use serde_json::{json, Value};

/// `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`
pub fn validation_body(items: &[ValidationItem]) -> Value {
    json!({ "detail": items })
}

/// `{"detail": "message"}`
pub fn detail_body(message: &str) -> Value {
    json!({ "detail": message })
}

pub fn deleted() -> Value {
    json!({ "status": "deleted" })
}
