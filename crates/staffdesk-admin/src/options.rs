//! Pick-list entries for reference fields.

#![allow(missing_docs)]

use staffdesk_client::{RemoteError, ResourceApi};
use staffdesk_model::ListQuery;

/// One selectable record: its id and human label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOption {
    pub id: i64,
    pub label: String,
}

/// Records offered by a reference field such as a leave's employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceOptions {
    options: Vec<ReferenceOption>,
}

impl ReferenceOptions {
    /// Page size the leave form asks for.
    pub const DEFAULT_LIMIT: u32 = 50;

    /// First page of `api`'s collection, in server order. Rows without an id
    /// are skipped.
    pub fn load<A: ResourceApi>(api: &A, limit: u32) -> Result<Self, RemoteError> {
        let schema = api.schema();
        let page = api.list(&ListQuery::new(limit))?;
        let options = page
            .rows
            .iter()
            .filter_map(|row| {
                row.id().map(|id| ReferenceOption {
                    id,
                    label: schema.option_label(row),
                })
            })
            .collect();
        Ok(Self { options })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn label_for(&self, id: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use staffdesk_model::schema::EMPLOYEE;
    use staffdesk_model::{EntitySchema, PageMeta, PageResult, Record};

    struct TwoEmployees {
        requested_limit: Cell<u32>,
    }

    impl ResourceApi for TwoEmployees {
        fn schema(&self) -> &'static EntitySchema {
            &EMPLOYEE
        }

        fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError> {
            self.requested_limit.set(query.page_size);
            Ok(PageResult {
                rows: vec![
                    Record::new()
                        .with("id", 1_i64)
                        .with("firstName", "Jane")
                        .with("lastName", "Doe")
                        .with("email", "jane@example.com"),
                    Record::new()
                        .with("id", 3_i64)
                        .with("firstName", "Jane")
                        .with("lastName", "Doe")
                        .with("email", "jane.doe@example.org"),
                    Record::new().with("firstName", "No").with("lastName", "Id"),
                    Record::new().with("id", 2_i64),
                ],
                total_count: 4,
                meta: PageMeta::default(),
            })
        }

        fn get(&self, _id: i64) -> Result<Record, RemoteError> {
            Err(RemoteError::from_status(404, ""))
        }

        fn create(&self, fields: &Record) -> Result<Record, RemoteError> {
            Ok(fields.clone())
        }

        fn update(&self, _id: i64, fields: &Record) -> Result<Record, RemoteError> {
            Ok(fields.clone())
        }

        fn delete(&self, _id: i64) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[test]
    fn options_label_records_and_skip_rows_without_id() {
        let api = TwoEmployees {
            requested_limit: Cell::new(0),
        };
        let options = ReferenceOptions::load(&api, ReferenceOptions::DEFAULT_LIMIT).expect("load");
        assert_eq!(api.requested_limit.get(), 50);
        assert_eq!(options.len(), 3);
        assert_eq!(options.label_for(1), Some("Jane Doe (jane@example.com)"));
        assert_eq!(options.label_for(3), Some("Jane Doe (jane.doe@example.org)"));
        assert_eq!(options.label_for(2), Some("#2"));
        assert_eq!(options.label_for(4), None);
    }
}
