//! Liveness and version routes.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
}

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<Liveness> {
    Json(Liveness { status: "ok" })
}

async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /healthz, GET /version. `/health` belongs to the health resource.
pub fn common_routes() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/version", get(version))
}
