//! Routers for the reference backend.

mod common;
mod entity;
pub use common::common_routes;
pub use entity::{entity_routes, BODY_LIMIT};

use crate::state::BackendState;
use axum::Router;

/// Entry routes plus the common routes, ready to serve.
pub fn backend_router(state: BackendState) -> Router {
    common_routes().merge(entity_routes(state))
}
