//! Services shared by every entry manager, passed explicitly.

use crate::cache::QueryCache;
use crate::client::{EntryApi, HttpEntryApi};
use crate::error::ApiError;
use crate::notify::{Notifier, TracingNotifier};
use crate::settings::ClientSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn EntryApi>,
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    pub fn new(api: Arc<dyn EntryApi>, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, cache, notifier }
    }

    /// HTTP client and cache built from settings; notifications go to the log.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
        let api = HttpEntryApi::new(settings)?;
        Ok(Self::new(
            Arc::new(api),
            Arc::new(QueryCache::new(settings.stale_time)),
            Arc::new(TracingNotifier),
        ))
    }
}
