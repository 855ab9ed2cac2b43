//! HTTP handlers for the reference backend.

pub mod entity;
pub use entity::*;
