//! Reference backend services: in-memory CRUD, payload validation, timestamp normalization.

mod crud;
pub mod timestamp;
mod validation;
pub use crud::{CrudService, EntryStore, ListQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use validation::PayloadValidator;
