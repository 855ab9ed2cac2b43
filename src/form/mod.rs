//! Entry form: editable state, multi-choice selections, constraint checks and payload coercion.

mod payload;
mod selection;
mod state;
pub use payload::{build_payload, check_constraints, coerce_field};
pub use selection::Selection;
pub use state::{FormState, DEFAULT_TIME, DEFAULT_TIMEZONE};
