//! Request extractors for the reference backend.

mod auth;
pub use auth::{CurrentUser, BEARER_PREFIX};
