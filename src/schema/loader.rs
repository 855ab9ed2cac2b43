//! Load resource schemas from JSON text or a JSON file.

use crate::error::ConfigError;
use crate::schema::ResourceSchema;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Many(Vec<ResourceSchema>),
    One(ResourceSchema),
}

/// Parse a single resource schema object or an array of them.
pub fn load_from_str(json: &str) -> Result<Vec<ResourceSchema>, ConfigError> {
    let doc: SchemaDocument =
        serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(match doc {
        SchemaDocument::Many(v) => v,
        SchemaDocument::One(s) => vec![s],
    })
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<ResourceSchema>, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let schemas = load_from_str(&text)?;
    tracing::debug!(path = %path.display(), count = schemas.len(), "loaded resource schemas");
    Ok(schemas)
}
