//! Shared state for the reference backend routes.

use crate::schema::SchemaRegistry;
use crate::service::EntryStore;
use std::sync::Arc;

/// User that owns entries when no bearer token is configured.
pub const DEFAULT_USER_ID: i64 = 1;

/// A bearer token and the user it signs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticToken {
    pub token: String,
    pub user_id: i64,
}

#[derive(Clone)]
pub struct BackendState {
    pub registry: Arc<SchemaRegistry>,
    pub store: Arc<EntryStore>,
    /// When set, every entry route requires `Authorization: Bearer <token>`.
    pub auth: Option<StaticToken>,
}

impl BackendState {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            store: Arc::new(EntryStore::new()),
            auth: None,
        }
    }

    pub fn with_token(mut self, token: &str, user_id: i64) -> Self {
        self.auth = Some(StaticToken {
            token: token.to_string(),
            user_id,
        });
        self
    }
}
