//! Model errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while interpreting records against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Entity name that maps to no managed collection.
    #[error("unknown entity '{0}'")]
    UnknownEntity(SmolStr),

    /// Field name the schema does not declare.
    #[error("unknown field '{field}' for {entity}")]
    UnknownField { entity: &'static str, field: SmolStr },

    /// Field that is display only and cannot be edited.
    #[error("field '{0}' is read-only")]
    ReadOnlyField(SmolStr),

    /// Text input that does not parse as the field's kind.
    #[error("invalid value for '{field}': {message}")]
    InvalidInput { field: SmolStr, message: SmolStr },

    /// Backend payload that is not a record.
    #[error("malformed record: {0}")]
    MalformedRecord(SmolStr),
}
