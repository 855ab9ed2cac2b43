#![allow(dead_code)]

use lifepulse_entries::schema::SchemaRegistry;
use lifepulse_entries::{
    backend_router, builtin_schemas, AppContext, BackendState, ClientSettings, HttpEntryApi, MemoryNotifier,
    QueryCache,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub fn state() -> BackendState {
    BackendState::new(SchemaRegistry::resolve(builtin_schemas()).unwrap())
}

/// Serve `state` on a free local port and return its base URL.
pub async fn spawn_backend(state: BackendState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn settings(api_url: &str, token: Option<&str>) -> ClientSettings {
    ClientSettings {
        api_url: api_url.to_string(),
        timeout: Duration::from_secs(5),
        token: token.map(str::to_string),
        stale_time: Duration::from_secs(60),
    }
}

pub struct Harness {
    pub ctx: AppContext,
    pub api: Arc<HttpEntryApi>,
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<MemoryNotifier>,
}

pub fn harness(settings: &ClientSettings) -> Harness {
    let api = Arc::new(HttpEntryApi::new(settings).unwrap());
    let cache = Arc::new(QueryCache::new(settings.stale_time));
    let notifier = Arc::new(MemoryNotifier::new());
    let ctx = AppContext::new(api.clone(), cache.clone(), notifier.clone());
    Harness {
        ctx,
        api,
        cache,
        notifier,
    }
}
