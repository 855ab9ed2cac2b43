//! Validated set of resource schemas, indexed by resource name.

use crate::error::ConfigError;
use crate::schema::{validate, ResourceSchema};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    resources: Vec<ResourceSchema>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Validate every schema and index them. Resource names must be unique.
    pub fn resolve(schemas: Vec<ResourceSchema>) -> Result<Self, ConfigError> {
        let mut by_name = HashMap::new();
        for (i, schema) in schemas.iter().enumerate() {
            validate(schema)?;
            if by_name.insert(schema.resource.clone(), i).is_some() {
                return Err(ConfigError::DuplicateResource(schema.resource.clone()));
            }
        }
        Ok(Self {
            resources: schemas,
            by_name,
        })
    }

    pub fn get(&self, resource: &str) -> Option<&ResourceSchema> {
        self.by_name.get(resource).map(|&i| &self.resources[i])
    }

    pub fn resources(&self) -> &[ResourceSchema] {
        &self.resources
    }
}
