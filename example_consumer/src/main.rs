//! Demo: a scripted health-entry session through the entry manager.
//!
//! Run from repo root: `cargo run -p lifepulse-demo`
//! Without `LIFEPULSE_API_URL` an in-memory backend is started on a free local port.

use lifepulse_entries::schema::{load_from_path, SchemaRegistry};
use lifepulse_entries::{
    backend_router, builtin_schemas, AppContext, BackendState, ClientSettings, EntryManager, ListView,
    ResourceSchema, SubmitOutcome,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lifepulse_entries=info,lifepulse_demo=info")),
        )
        .init();

    let schemas = match std::env::var("LIFEPULSE_SCHEMA_PATH") {
        Ok(path) => load_from_path(&path).await?,
        Err(_) => builtin_schemas(),
    };
    let registry = SchemaRegistry::resolve(schemas)?;
    let mut settings = ClientSettings::from_env()?;

    if std::env::var("LIFEPULSE_API_URL").is_err() {
        let mut state = BackendState::new(registry.clone());
        if let Some(token) = &settings.token {
            state = state.with_token(token, 1);
        }
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        settings.api_url = format!("http://127.0.0.1:{}", port);
        tracing::info!("In-memory backend listening on {}", settings.api_url);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, backend_router(state)).await {
                tracing::error!(error = %e, "backend stopped");
            }
        });
    }

    let schema: ResourceSchema = registry
        .get("health")
        .cloned()
        .ok_or("no 'health' resource in the loaded schemas")?;
    let ctx = AppContext::from_settings(&settings)?;
    let mut manager = EntryManager::new(ctx, schema).with_initial_date("2024-03-01");

    let form = manager.form_mut();
    form.set_time("07:45");
    form.set_value("entry_type", "morning");
    form.set_value("sleep_hours", "7.5");
    form.set_value("energy_level", "8");
    form.set_value("wellbeing", "7");
    let created = match manager.submit().await {
        SubmitOutcome::Created(record) => record,
        SubmitOutcome::Invalid(errors) => {
            for (field, msg) in errors.iter() {
                tracing::warn!(%field, %msg, "field error");
            }
            return Ok(());
        }
        other => return Err(format!("create failed: {:?}", other).into()),
    };

    manager.begin_edit(&created);
    manager.form_mut().set_value("wellbeing", "11");
    if let SubmitOutcome::Invalid(errors) = manager.submit().await {
        tracing::info!(message = errors.get("wellbeing").unwrap_or_default(), "rejected as expected");
    }
    manager.form_mut().set_value("wellbeing", "9");
    manager.submit().await;

    match manager.list_view().await {
        ListView::Rows(table) => {
            tracing::info!(columns = %table.columns.join(" | "), "health entries");
            for row in &table.rows {
                tracing::info!("{}", row.cells.join(" | "));
            }
        }
        ListView::Empty => tracing::info!("no entries yet"),
        ListView::Failed(msg) => tracing::warn!(%msg, "could not load entries"),
    }

    manager.delete(created.id).await?;
    tracing::info!(id = created.id, "demo entry removed");
    Ok(())
}
