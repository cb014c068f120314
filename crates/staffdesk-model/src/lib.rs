//! `staffdesk-model` - records, entity schemas, and local validation.
//!
//! Everything in this crate is network free. The managed collections
//! (employees, leaves, users) share one record shape: a flat, ordered map of
//! field name to [`FieldValue`], identified by an integer `id`. What differs per
//! collection is captured by an [`EntitySchema`]: which fields exist, how they
//! decode from the backend, which are sent back on create/update, and which
//! rules they must satisfy before a submission is allowed.
//!
//! # Example
//!
//! ```
//! use staffdesk_model::{validate, EntityKind, Record};
//!
//! let schema = EntityKind::Employee.schema();
//! let draft = Record::new()
//!     .with("firstName", "A")
//!     .with("lastName", "Doe")
//!     .with("email", "bad")
//!     .with("phoneNumber", "123456");
//!
//! let errors = validate(schema, &draft);
//! let fields: Vec<_> = errors.iter().map(|err| err.field.as_str()).collect();
//! assert_eq!(fields, ["firstName", "email"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Model errors.
pub mod error;
/// List query state and page results.
pub mod query;
/// Field values and entity records.
pub mod record;
/// Entity schemas for the managed collections.
pub mod schema;
/// Local form validation.
pub mod validate;

pub use error::ModelError;
pub use query::{page_count, ListQuery, PageMeta, PageResult, SortDirection, SortSpec};
pub use record::{FieldValue, Record};
pub use schema::{
    EntityKind, EntitySchema, FieldAccess, FieldDefault, FieldKind, FieldSpec, PayloadMode,
};
pub use validate::{validate, FieldError};
