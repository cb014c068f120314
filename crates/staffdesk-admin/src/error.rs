//! Admin core errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use staffdesk_client::RemoteError;
use staffdesk_model::{FieldError, ModelError};
use thiserror::Error;

/// Failures surfaced by the list and form controllers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Local rule failures; nothing was sent.
    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Backend failure, message forwarded verbatim.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Record or field input that does not fit the schema.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid configuration file or value.
    #[error("invalid config: {0}")]
    InvalidConfig(SmolStr),
}

impl AdminError {
    /// Field errors of a rejected submission, empty for other failures.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
