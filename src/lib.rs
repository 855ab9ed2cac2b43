//! LifePulse entries: schema-driven entry management for daily metrics.
//!
//! The client side (`manager`, `form`, `cache`, `client`) turns a resource schema into a
//! create/edit form and a record table against the REST resource API. The `routes` module
//! serves the same API from memory.

pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod extractors;
pub mod field_errors;
pub mod form;
pub mod handlers;
pub mod manager;
pub mod notify;
pub mod record;
pub mod resources;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod state;

pub use cache::{QueryCache, QueryStatus, Records};
pub use client::{EntryApi, HttpEntryApi, ListParams, UnauthorizedHandler};
pub use context::AppContext;
pub use error::{ApiError, BackendError, ConfigError, ErrorBody};
pub use field_errors::{error_message, parse_validation_errors, FieldErrors, ValidationFailure, ValidationItem};
pub use form::{FormState, Selection};
pub use manager::{EntryManager, ListView, Phase, SubmitOutcome, Table, TableRow};
pub use notify::{MemoryNotifier, Notification, Notifier, TracingNotifier};
pub use record::{EntryRecord, Payload};
pub use resources::{builtin_schemas, FinanceEntry, HealthEntry, LearningEntry, ProductivityEntry, Resource};
pub use routes::{backend_router, common_routes, entity_routes};
pub use schema::{FieldKind, FieldSchema, ResourceSchema, SchemaRegistry};
pub use settings::ClientSettings;
pub use state::BackendState;
