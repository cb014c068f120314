//! `staffdesk-admin` - list and form controllers for the staffdesk collections.
//!
//! A [`ListController`] drives one paginated, searchable, sortable list
//! screen; a [`FormController`] drives one create/edit form. Both are generic
//! over [`staffdesk_client::ResourceApi`], so the same controllers serve
//! employees, leaves, and users, and tests can run them against fakes or the
//! in-process stub backend.
//!
//! Controllers are single-owner state machines: nothing here locks. List
//! fetches can run synchronously or on a [`FetchDispatcher`]; either way only
//! the newest result is applied.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Admin configuration.
pub mod config;
/// Background list fetches.
pub mod dispatch;
/// Admin core errors.
pub mod error;
/// Create/edit form controller.
pub mod form;
/// Paginated list controller.
pub mod list;
/// Pick-list entries for reference fields.
pub mod options;
/// Plain-text rendering.
pub mod render;

pub use config::AdminConfig;
pub use dispatch::{Completion, FetchDispatcher};
pub use error::AdminError;
pub use form::{FormBuffer, FormController, FormMode, Submitted};
pub use list::{ApplyOutcome, FetchTicket, ListController, ListStatus};
pub use options::{ReferenceOption, ReferenceOptions};
