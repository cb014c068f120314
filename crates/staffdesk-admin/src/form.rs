//! Create/edit form controller.

#![allow(missing_docs)]

use smol_str::SmolStr;
use staffdesk_client::ResourceApi;
use staffdesk_model::{
    validate, EntitySchema, FieldAccess, FieldError, FieldValue, ModelError, Record,
};
use tracing::{debug, info};

use crate::error::AdminError;

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Editable field values plus the errors shown next to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBuffer {
    draft: Record,
    /// Text that failed to parse for its field kind.
    input_errors: Vec<FieldError>,
    /// Rule failures from the last validation.
    rule_errors: Vec<FieldError>,
}

impl FormBuffer {
    fn new(draft: Record) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &Record {
        &self.draft
    }

    /// Input errors first, then rule errors for the remaining fields.
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors = self.input_errors.clone();
        errors.extend(
            self.rule_errors
                .iter()
                .filter(|err| !self.has_input_error(&err.field))
                .cloned(),
        );
        errors
    }

    /// First error message for `field`.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.input_errors
            .iter()
            .chain(&self.rule_errors)
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }

    fn has_input_error(&self, field: &str) -> bool {
        self.input_errors.iter().any(|err| err.field == field)
    }

    fn clear_input_error(&mut self, field: &str) {
        self.input_errors.retain(|err| err.field != field);
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    /// Record as stored by the backend.
    pub record: Record,
    /// Route of the collection's list screen.
    pub navigate_to: String,
}

/// Form state for one record of one collection.
#[derive(Debug)]
pub struct FormController<A> {
    api: A,
    mode: FormMode,
    buffer: FormBuffer,
}

impl<A: ResourceApi> FormController<A> {
    /// Create form with every field at its default.
    pub fn new(api: A) -> Self {
        let buffer = FormBuffer::new(api.schema().defaults());
        Self {
            api,
            mode: FormMode::Create,
            buffer,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.api.schema()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn buffer(&self) -> &FormBuffer {
        &self.buffer
    }

    pub fn draft(&self) -> &Record {
        &self.buffer.draft
    }

    /// `None` resets to a create form. `Some(id)` fetches the record and
    /// prefills the editable fields; on failure the form is left untouched.
    pub fn load(&mut self, id: Option<i64>) -> Result<(), AdminError> {
        let schema = self.schema();
        let Some(id) = id else {
            self.mode = FormMode::Create;
            self.buffer = FormBuffer::new(schema.defaults());
            return Ok(());
        };
        let fetched = self.api.get(id)?;
        debug!(entity = schema.title, id, "prefilling edit form");
        self.mode = FormMode::Edit(id);
        self.buffer = FormBuffer::new(schema.prefill(&fetched));
        Ok(())
    }

    /// Stores a typed value. Display-only fields are rejected.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), AdminError> {
        let spec = self.schema().require_field(field)?;
        if spec.access == FieldAccess::ReadOnly {
            return Err(ModelError::ReadOnlyField(SmolStr::new(field)).into());
        }
        self.buffer.clear_input_error(field);
        self.buffer.draft.set(spec.name, value);
        Ok(())
    }

    /// Parses user text for `field`. Unparseable text leaves the stored value
    /// alone and is reported on the field.
    pub fn set_input(&mut self, field: &str, text: &str) -> Result<(), AdminError> {
        let spec = self.schema().require_field(field)?;
        match spec.parse_input(text) {
            Ok(value) => {
                self.buffer.clear_input_error(field);
                self.buffer.draft.set(spec.name, value);
                Ok(())
            }
            Err(ModelError::InvalidInput { field, message }) => {
                self.buffer.clear_input_error(&field);
                self.buffer
                    .input_errors
                    .push(FieldError::new(field.clone(), message.clone()));
                Err(ModelError::InvalidInput { field, message }.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Runs the schema rules on the buffer and returns every field error.
    pub fn validate(&mut self) -> Vec<FieldError> {
        self.buffer.rule_errors = validate(self.schema(), &self.buffer.draft);
        self.buffer.errors()
    }

    /// Validates, then creates or updates. Field errors block the request.
    /// A backend failure keeps the buffer for another attempt.
    pub fn submit(&mut self) -> Result<Submitted, AdminError> {
        let errors = self.validate();
        if !errors.is_empty() {
            debug!(
                entity = self.schema().title,
                errors = errors.len(),
                "submission blocked by validation"
            );
            return Err(AdminError::Validation(errors));
        }
        let schema = self.schema();
        let record = match self.mode {
            FormMode::Create => self.api.create(&self.buffer.draft)?,
            FormMode::Edit(id) => self.api.update(id, &self.buffer.draft)?,
        };
        info!(entity = schema.title, id = record.id(), "record saved");
        Ok(Submitted {
            record,
            navigate_to: format!("/{}", schema.collection),
        })
    }
}
