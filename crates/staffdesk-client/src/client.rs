//! HTTP implementation of [`ResourceApi`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use staffdesk_model::{EntitySchema, ListQuery, PageResult, PayloadMode, Record};
use tracing::{debug, warn};

use crate::api::ResourceApi;
use crate::envelope::{Envelope, Paginated};
use crate::error::RemoteError;
use crate::session::SessionProvider;

/// Transport tuning. `None` keeps the transport default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Socket read timeout.
    pub read_timeout: Option<Duration>,
}

/// Bearer-authenticated client for one backend collection.
pub struct ResourceClient {
    agent: ureq::Agent,
    collection_url: String,
    schema: &'static EntitySchema,
    session: Arc<dyn SessionProvider>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("collection_url", &self.collection_url)
            .field("entity", &self.schema.title)
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    /// Client for `{backend_url}/{schema.collection}` with transport defaults.
    pub fn new(
        backend_url: &str,
        schema: &'static EntitySchema,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self::with_options(backend_url, schema, session, ClientOptions::default())
    }

    /// Client for `{backend_url}/{schema.collection}` with explicit timeouts.
    pub fn with_options(
        backend_url: &str,
        schema: &'static EntitySchema,
        session: Arc<dyn SessionProvider>,
        options: ClientOptions,
    ) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = options.connect_timeout {
            builder = builder.timeout_connect(timeout);
        }
        if let Some(timeout) = options.read_timeout {
            builder = builder.timeout_read(timeout);
        }
        let collection_url = format!(
            "{}/{}",
            backend_url.trim_end_matches('/'),
            schema.collection
        );
        Self {
            agent: builder.build(),
            collection_url,
            schema,
            session,
        }
    }

    /// `{backend}/{collection}` without a trailing slash.
    #[must_use]
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// List URL: search and sort parameters only when set.
    #[must_use]
    pub fn list_url(&self, query: &ListQuery) -> String {
        let mut url = format!(
            "{}?page={}&limit={}",
            self.collection_url, query.page, query.page_size
        );
        if !query.search.is_empty() {
            url.push_str("&search=");
            url.push_str(&urlencoding::encode(&query.search));
        }
        if let Some(sort) = query.sort.as_ref().filter(|sort| !sort.field.is_empty()) {
            url.push_str("&orderBy[name]=");
            url.push_str(&urlencoding::encode(&sort.field));
            url.push_str("&orderBy[direction]=");
            url.push_str(sort.direction.as_param());
        }
        url
    }

    fn record_url(&self, id: i64) -> String {
        format!("{}/{id}", self.collection_url)
    }

    fn bearer(&self) -> Result<String, RemoteError> {
        self.session
            .access_token()
            .map(|token| format!("Bearer {token}"))
            .ok_or_else(|| RemoteError::auth("Not signed in"))
    }

    /// Sends one request and returns `(status, body)` of a 2xx response.
    fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
    ) -> Result<(u16, String), RemoteError> {
        let authorization = self.bearer()?;
        let request = self
            .agent
            .request(method, url)
            .set("Authorization", &authorization)
            .set("Accept", "application/json");
        let response = match body {
            Some(payload) => request
                .set("Content-Type", "application/json")
                .send_string(&payload.to_string()),
            None => request.call(),
        };
        match response {
            Ok(response) => {
                let status = response.status();
                debug!(method, url, status, "backend request");
                let text = response
                    .into_string()
                    .map_err(|err| RemoteError::malformed(status, err))?;
                Ok((status, text))
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                let err = RemoteError::from_status(status, &text);
                warn!(method, url, status, message = %err.message, "backend rejected request");
                Err(err)
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(method, url, error = %transport, "backend unreachable");
                Err(RemoteError::transport(transport.to_string()))
            }
        }
    }

    fn decode_record(&self, status: u16, body: &str) -> Result<Record, RemoteError> {
        let envelope: Envelope<Value> =
            serde_json::from_str(body).map_err(|err| RemoteError::malformed(status, err))?;
        if envelope.data.is_null() {
            return Ok(Record::new());
        }
        self.schema
            .decode(&envelope.data)
            .map_err(|err| RemoteError::malformed(status, err))
    }
}

impl ResourceApi for ResourceClient {
    fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError> {
        let url = self.list_url(query);
        let (status, body) = self.send("GET", &url, None)?;
        let envelope: Envelope<Paginated<Value>> =
            serde_json::from_str(&body).map_err(|err| RemoteError::malformed(status, err))?;
        let Paginated { meta, data } = envelope.data;
        let rows = data
            .iter()
            .map(|row| self.schema.decode(row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RemoteError::malformed(status, err))?;
        Ok(PageResult {
            rows,
            total_count: meta.total_count(),
            meta,
        })
    }

    fn get(&self, id: i64) -> Result<Record, RemoteError> {
        let (status, body) = self.send("GET", &self.record_url(id), None)?;
        self.decode_record(status, &body)
    }

    fn create(&self, fields: &Record) -> Result<Record, RemoteError> {
        let payload = self.schema.encode_payload(fields, PayloadMode::Create);
        let (status, body) = self.send("POST", &self.collection_url, Some(&payload))?;
        self.decode_record(status, &body)
    }

    fn update(&self, id: i64, fields: &Record) -> Result<Record, RemoteError> {
        let payload = self.schema.encode_payload(fields, PayloadMode::Update);
        let (status, body) = self.send("PATCH", &self.record_url(id), Some(&payload))?;
        self.decode_record(status, &body)
    }

    fn delete(&self, id: i64) -> Result<(), RemoteError> {
        self.send("DELETE", &self.record_url(id), None).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSession;
    use staffdesk_model::schema::{EMPLOYEE, LEAVE};
    use staffdesk_model::{SortDirection, SortSpec};

    fn client(schema: &'static EntitySchema) -> ResourceClient {
        ResourceClient::new(
            "http://backend.test/api/",
            schema,
            Arc::new(StaticSession::new("token")),
        )
    }

    #[test]
    fn list_url_omits_empty_search_and_sort() {
        let client = client(&EMPLOYEE);
        assert_eq!(client.collection_url(), "http://backend.test/api/employees");
        let query = ListQuery::new(10);
        assert_eq!(
            client.list_url(&query),
            "http://backend.test/api/employees?page=1&limit=10"
        );
    }

    #[test]
    fn list_url_appends_encoded_search_and_sort() {
        let client = client(&LEAVE);
        let mut query = ListQuery::new(25);
        query.page = 3;
        query.search = "jane doe&co".to_string();
        query.sort = Some(SortSpec {
            field: "startDate".into(),
            direction: SortDirection::Descending,
        });
        assert_eq!(
            client.list_url(&query),
            "http://backend.test/api/leaves?page=3&limit=25&search=jane%20doe%26co\
             &orderBy[name]=startDate&orderBy[direction]=desc"
        );
    }

    #[test]
    fn list_url_ignores_blank_sort_field() {
        let client = client(&EMPLOYEE);
        let mut query = ListQuery::new(10);
        query.sort = Some(SortSpec {
            field: "".into(),
            direction: SortDirection::Ascending,
        });
        assert!(!client.list_url(&query).contains("orderBy"));
    }

    #[test]
    fn anonymous_session_fails_before_any_request() {
        let client = ResourceClient::new(
            "http://127.0.0.1:9",
            &EMPLOYEE,
            Arc::new(StaticSession::anonymous()),
        );
        let err = client.get(1).expect_err("auth error");
        assert!(err.is_auth());
        assert_eq!(err.status, None);
    }
}
