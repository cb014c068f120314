//! `staffdesk-client` - remote resource client for the staffdesk backend.
//!
//! [`ResourceClient`] issues single-shot, bearer-authenticated HTTP calls
//! against one backend collection and normalizes every failure into a
//! [`RemoteError`]. Controllers depend on the [`ResourceApi`] trait rather than
//! the concrete client, so tests can swap in fakes or the in-process
//! [`stub::StubBackend`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Resource operations shared by the HTTP client and test doubles.
pub mod api;
/// HTTP implementation of [`ResourceApi`].
pub mod client;
/// Backend response envelopes.
pub mod envelope;
/// Remote error taxonomy.
pub mod error;
/// Session provider capability.
pub mod session;
/// In-process stub backend.
pub mod stub;

pub use api::ResourceApi;
pub use client::{ClientOptions, ResourceClient};
pub use error::{RemoteError, RemoteErrorKind};
pub use session::{SessionProvider, SharedSession, StaticSession};
