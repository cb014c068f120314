//! Resource operations shared by the HTTP client and test doubles.

use std::sync::Arc;

use staffdesk_model::{EntitySchema, ListQuery, PageResult, Record};

use crate::error::RemoteError;

/// CRUD operations on one backend collection.
///
/// Every call is single shot: failures surface immediately, nothing retries.
pub trait ResourceApi {
    /// Schema of the collection this API serves.
    fn schema(&self) -> &'static EntitySchema;

    /// One page of rows for `query`.
    fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError>;

    /// A single record by id.
    fn get(&self, id: i64) -> Result<Record, RemoteError>;

    /// Creates a record from `fields`; returns the stored record.
    fn create(&self, fields: &Record) -> Result<Record, RemoteError>;

    /// Replaces the editable fields of record `id`.
    fn update(&self, id: i64, fields: &Record) -> Result<Record, RemoteError>;

    /// Deletes record `id`. Refreshing any list is the caller's job.
    fn delete(&self, id: i64) -> Result<(), RemoteError>;
}

impl<T: ResourceApi + ?Sized> ResourceApi for Arc<T> {
    fn schema(&self) -> &'static EntitySchema {
        (**self).schema()
    }

    fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError> {
        (**self).list(query)
    }

    fn get(&self, id: i64) -> Result<Record, RemoteError> {
        (**self).get(id)
    }

    fn create(&self, fields: &Record) -> Result<Record, RemoteError> {
        (**self).create(fields)
    }

    fn update(&self, id: i64, fields: &Record) -> Result<Record, RemoteError> {
        (**self).update(id, fields)
    }

    fn delete(&self, id: i64) -> Result<(), RemoteError> {
        (**self).delete(id)
    }
}

impl<T: ResourceApi + ?Sized> ResourceApi for &T {
    fn schema(&self) -> &'static EntitySchema {
        (**self).schema()
    }

    fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError> {
        (**self).list(query)
    }

    fn get(&self, id: i64) -> Result<Record, RemoteError> {
        (**self).get(id)
    }

    fn create(&self, fields: &Record) -> Result<Record, RemoteError> {
        (**self).create(fields)
    }

    fn update(&self, id: i64, fields: &Record) -> Result<Record, RemoteError> {
        (**self).update(id, fields)
    }

    fn delete(&self, id: i64) -> Result<(), RemoteError> {
        (**self).delete(id)
    }
}
