//! Generic entry manager: one resource's create/edit form and record table, driven by its schema.

use crate::cache::Records;
use crate::client::ListParams;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::field_errors::{error_message, parse_validation_errors, FieldErrors};
use crate::form::{build_payload, FormState};
use crate::record::{display_value, EntryRecord};
use crate::schema::ResourceSchema;
use tokio::sync::watch;

/// Form lifecycle: `Idle -> Submitting -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created(EntryRecord),
    Updated(EntryRecord),
    /// Per-field messages, from input constraints or a structured 422. The form keeps its values.
    Invalid(FieldErrors),
    /// Any other failure; already reported through the notifier.
    Failed(ApiError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Failed(String),
    Empty,
    Rows(Table),
}

pub struct EntryManager {
    ctx: AppContext,
    schema: ResourceSchema,
    form: FormState,
    phase: watch::Sender<Phase>,
    params: ListParams,
}

impl EntryManager {
    pub fn new(ctx: AppContext, schema: ResourceSchema) -> Self {
        Self {
            ctx,
            schema,
            form: FormState::default(),
            phase: watch::channel(Phase::Idle).0,
            params: ListParams::default(),
        }
    }

    /// Pre-fill the date of the first new entry, e.g. from a `?date=` link.
    pub fn with_initial_date(mut self, date: &str) -> Self {
        self.form = FormState::new(Some(date));
        self
    }

    pub fn with_list_params(mut self, params: ListParams) -> Self {
        self.params = params;
        self
    }

    pub fn resource(&self) -> &str {
        &self.schema.resource
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Follow phase changes, e.g. to disable the submit button while a request is in flight.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// All records of the resource, in server order, through the cache.
    pub async fn load(&self) -> Result<Records, ApiError> {
        let resource = self.schema.resource.as_str();
        let api = &self.ctx.api;
        let params = &self.params;
        self.ctx
            .cache
            .fetch(resource, || api.list(resource, params))
            .await
    }

    pub async fn list_view(&self) -> ListView {
        match self.load().await {
            Ok(records) if records.is_empty() => ListView::Empty,
            Ok(records) => ListView::Rows(self.table(&records)),
            Err(e) => {
                tracing::warn!(resource = %self.schema.resource, error = %e, "failed to load entries");
                ListView::Failed(error_message(&e))
            }
        }
    }

    /// `id`, `local_date`, then every schema field.
    pub fn columns(&self) -> Vec<String> {
        ["id", "local_date"]
            .into_iter()
            .map(str::to_string)
            .chain(self.schema.fields.iter().map(|f| f.name.clone()))
            .collect()
    }

    pub fn table(&self, records: &[EntryRecord]) -> Table {
        let columns = self.columns();
        let rows = records
            .iter()
            .map(|r| TableRow {
                id: r.id,
                cells: columns.iter().map(|c| display_value(&r.column(c))).collect(),
            })
            .collect();
        Table { columns, rows }
    }

    pub fn begin_edit(&mut self, record: &EntryRecord) {
        self.form.begin_edit(record, &self.schema);
    }

    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    /// Create or update from the current form. Success invalidates the resource's cached list
    /// and resets the form; field errors keep the entered values. Never retried.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let payload = match build_payload(&self.schema, &self.form) {
            Ok(p) => p,
            Err(errors) => {
                self.form.set_errors(errors.clone());
                return SubmitOutcome::Invalid(errors);
            }
        };

        let resource = self.schema.resource.clone();
        let editing = self.form.editing_id();
        self.phase.send_replace(Phase::Submitting);
        let result = match editing {
            Some(id) => self.ctx.api.update(&resource, id, &payload).await,
            None => self.ctx.api.create(&resource, &payload).await,
        };
        self.phase.send_replace(Phase::Idle);

        match result {
            Ok(record) => {
                self.ctx.cache.invalidate(&resource);
                self.form.reset();
                if editing.is_some() {
                    tracing::info!(resource = %resource, id = record.id, "entry updated");
                    self.ctx.notifier.success("Entry saved");
                    SubmitOutcome::Updated(record)
                } else {
                    tracing::info!(resource = %resource, id = record.id, "entry created");
                    self.ctx.notifier.success("Entry added");
                    SubmitOutcome::Created(record)
                }
            }
            Err(err) => {
                let errors = parse_validation_errors(&err);
                if errors.is_empty() {
                    tracing::warn!(resource = %resource, error = %err, "submit failed");
                    self.ctx.notifier.error(&error_message(&err));
                    SubmitOutcome::Failed(err)
                } else {
                    tracing::debug!(resource = %resource, fields = errors.len(), "submit rejected by server");
                    self.form.set_errors(errors.clone());
                    SubmitOutcome::Invalid(errors)
                }
            }
        }
    }

    /// Delete without confirmation; invalidates the cached list on success.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let resource = self.schema.resource.as_str();
        match self.ctx.api.delete(resource, id).await {
            Ok(()) => {
                tracing::info!(resource, id, "entry deleted");
                self.ctx.cache.invalidate(resource);
                Ok(())
            }
            Err(err) => {
                self.ctx.notifier.error(&error_message(&err));
                Err(err)
            }
        }
    }
}
