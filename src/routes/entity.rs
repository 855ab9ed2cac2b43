//! Entry routes: `/{resource}` and `/{resource}/{id}` for every registered resource.
//! Handlers look the resource up in the registry, so unknown names answer 404.

use crate::handlers::entity::{create, delete as delete_handler, list, update};
use crate::state::BackendState;
use axum::{routing::get, routing::put, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Upper bound on a create/update body.
pub const BODY_LIMIT: usize = 64 * 1024;

pub fn entity_routes(state: BackendState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route("/:resource/:id", put(update).delete(delete_handler))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(BODY_LIMIT)))
        .with_state(state)
}
