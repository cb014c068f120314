//! In-process stub backend.
//!
//! Serves the employees/leaves/users collection endpoints from memory over
//! `tiny_http`, with the same envelope, pagination, search, sort, bearer check,
//! and 4xx messages the real backend produces. Used by integration tests and
//! by `staffdesk stub` for local demos.

use std::cmp::Ordering;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use staffdesk_model::{
    page_count, validate, EntityKind, EntitySchema, FieldAccess, FieldKind, PageMeta,
};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info};

use crate::envelope::{Envelope, Paginated};

type Row = Map<String, Value>;

struct Collection {
    schema: &'static EntitySchema,
    last_id: i64,
    rows: IndexMap<i64, Row>,
}

impl Collection {
    fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            last_id: 0,
            rows: IndexMap::new(),
        }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

struct StubState {
    collections: IndexMap<&'static str, Collection>,
}

/// Running stub backend. Stops when dropped.
pub struct StubBackend {
    server: Arc<Server>,
    state: Arc<Mutex<StubState>>,
    requests: Arc<AtomicUsize>,
    addr: SocketAddr,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubBackend {
    /// Binds `listen` (`127.0.0.1:0` picks a free port) and starts serving.
    /// With `token` set, requests without `Authorization: Bearer {token}` get 401.
    pub fn start(listen: &str, token: Option<&str>) -> io::Result<Self> {
        let server = Server::http(listen)
            .map_err(|err| io::Error::other(format!("stub bind {listen}: {err}")))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| io::Error::other("stub must listen on an IP address"))?;
        let server = Arc::new(server);
        let state = Arc::new(Mutex::new(StubState::new()));
        let requests = Arc::new(AtomicUsize::new(0));
        let expected = token.map(|token| format!("Bearer {token}"));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    requests.fetch_add(1, AtomicOrdering::SeqCst);
                    let (status, body) = handle_request(&state, expected.as_deref(), &mut request);
                    debug!(
                        method = %request.method(),
                        url = request.url(),
                        status,
                        "stub request"
                    );
                    if let Err(err) = request.respond(json_response(status, &body)) {
                        debug!(error = %err, "stub response not delivered");
                    }
                }
            })
        };
        info!(%addr, "stub backend listening");
        Ok(Self {
            server,
            state,
            requests,
            addr,
            handle: Some(handle),
        })
    }

    /// Bound socket address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://{addr}`, the backend base URL for clients.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, including rejected ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    /// Inserts a row as-is (no validation) and returns its id.
    pub fn seed(&self, kind: EntityKind, fields: Value) -> i64 {
        let mut state = self.state.lock();
        let collection = state.collection_mut(kind);
        let id = collection.next_id();
        let mut row = match fields {
            Value::Object(map) => map,
            _ => Row::new(),
        };
        row.insert("id".to_string(), json!(id));
        collection.rows.insert(id, row);
        id
    }

    /// Seeds a handful of employees, users, and leaves for demos.
    pub fn seed_demo(&self) {
        let people = [
            ("Jane", "Doe", "FEMALE"),
            ("John", "Smith", "MALE"),
            ("Aiko", "Tanaka", "FEMALE"),
            ("Omar", "Haddad", "MALE"),
            ("Lena", "Fischer", "FEMALE"),
            ("Tomas", "Novak", "MALE"),
        ];
        let mut employee_ids = Vec::new();
        for (index, (first, last, gender)) in people.iter().enumerate() {
            let email = format!("{}.{}@example.com", first, last).to_lowercase();
            employee_ids.push(self.seed(
                EntityKind::Employee,
                json!({
                    "firstName": first,
                    "lastName": last,
                    "email": email,
                    "phoneNumber": format!("555-01{index:02}"),
                    "address": format!("{} Main St", index + 1),
                    "gender": gender,
                }),
            ));
        }
        self.seed(
            EntityKind::User,
            json!({
                "firstName": "Admin",
                "lastName": "Root",
                "email": "admin@example.com",
                "password": "changeme",
                "birthDate": "1990-01-01T00:00:00.000Z",
                "gender": "MALE",
            }),
        );
        for (offset, employee_id) in employee_ids.iter().take(3).enumerate() {
            let day = offset * 7 + 1;
            self.seed(
                EntityKind::Leave,
                json!({
                    "employeeId": employee_id,
                    "startDate": format!("2024-03-{day:02}T00:00:00.000Z"),
                    "endDate": format!("2024-03-{:02}T00:00:00.000Z", day + 2),
                    "reason": "Annual leave",
                }),
            );
        }
    }

    /// Stored rows of one collection.
    #[must_use]
    pub fn len(&self, kind: EntityKind) -> usize {
        self.state.lock().collection(kind).rows.len()
    }

    /// Raw stored row, including write-only fields.
    #[must_use]
    pub fn stored(&self, kind: EntityKind, id: i64) -> Option<Value> {
        self.state
            .lock()
            .collection(kind)
            .rows
            .get(&id)
            .cloned()
            .map(Value::Object)
    }

    /// Blocks until the server stops.
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl StubState {
    fn new() -> Self {
        let collections = EntityKind::ALL
            .iter()
            .map(|kind| {
                let schema = kind.schema();
                (schema.collection, Collection::new(schema))
            })
            .collect();
        Self { collections }
    }

    fn collection(&self, kind: EntityKind) -> &Collection {
        &self.collections[kind.schema().collection]
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut Collection {
        &mut self.collections[kind.schema().collection]
    }

    fn list(&self, name: &str, params: &IndexMap<String, String>) -> (u16, Value) {
        let Some(collection) = self.collections.get(name) else {
            return failure(404, "Route not found", "Not Found");
        };
        let page = positive_param(params, "page").unwrap_or(1);
        let limit = positive_param(params, "limit").unwrap_or(10);
        let needle = params
            .get("search")
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty());

        let mut rows: Vec<Value> = collection
            .rows
            .values()
            .map(|row| self.present(collection.schema, row))
            .filter(|row| needle.as_deref().is_none_or(|needle| contains_text(row, needle)))
            .collect();
        if let Some(field) = params.get("orderBy[name]").filter(|field| !field.is_empty()) {
            rows.sort_by(|a, b| compare_values(a.get(field), b.get(field)));
            if params.get("orderBy[direction]").map(String::as_str) == Some("desc") {
                rows.reverse();
            }
        }

        let total = rows.len() as u64;
        let offset = (page - 1).saturating_mul(limit);
        let data: Vec<Value> = rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        let count = data.len() as u64;
        let meta = PageMeta {
            first: if count == 0 { 0 } else { offset.saturating_add(1) },
            last: offset.saturating_add(count),
            current_page: page,
            max_pages: u64::from(page_count(total, u32::try_from(limit).unwrap_or(u32::MAX))),
            limit,
            count,
            total: Some(total),
        };
        ok(200, "OK", Paginated { meta, data })
    }

    fn get(&self, name: &str, id: i64) -> (u16, Value) {
        let Some(collection) = self.collections.get(name) else {
            return failure(404, "Route not found", "Not Found");
        };
        match collection.rows.get(&id) {
            Some(row) => ok(200, "OK", self.present(collection.schema, row)),
            None => not_found(collection.schema, id),
        }
    }

    fn delete(&mut self, name: &str, id: i64) -> (u16, Value) {
        let Some(collection) = self.collections.get_mut(name) else {
            return failure(404, "Route not found", "Not Found");
        };
        match collection.rows.shift_remove(&id) {
            Some(_) => ok(200, "Deleted", Value::Null),
            None => not_found(collection.schema, id),
        }
    }

    /// Create (`id == None`) or partial update, with backend-side checks.
    fn write(&mut self, name: &str, id: Option<i64>, body: Option<Value>) -> (u16, Value) {
        let Some(collection) = self.collections.get(name) else {
            return failure(404, "Route not found", "Not Found");
        };
        let schema = collection.schema;
        let Some(Value::Object(fields)) = body else {
            return failure(400, "Request body must be a JSON object", "Bad Request");
        };
        let mut row = match id {
            Some(id) => match collection.rows.get(&id) {
                Some(existing) => existing.clone(),
                None => return not_found(schema, id),
            },
            None => Row::new(),
        };
        for (key, value) in fields {
            if key != "id" {
                row.insert(key, value);
            }
        }
        if let Err(message) = self.check(schema, &row, id) {
            return failure(400, &message, "Bad Request");
        }
        for spec in schema.fields {
            if spec.access == FieldAccess::UpdateOnly {
                row.remove(spec.name);
            }
        }

        let collection = &mut self.collections[name];
        let (status, id) = match id {
            Some(id) => (200, id),
            None => (201, collection.next_id()),
        };
        row.insert("id".to_string(), json!(id));
        collection.rows.insert(id, row.clone());
        let presented = self.present(schema, &row);
        let message = if status == 201 { "Created" } else { "Updated" };
        ok(status, message, presented)
    }

    fn check(&self, schema: &EntitySchema, row: &Row, id: Option<i64>) -> Result<(), String> {
        let record = schema
            .decode(&Value::Object(row.clone()))
            .map_err(|err| err.to_string())?;
        if let Some(err) = validate(schema, &record).into_iter().next() {
            return Err(err.to_string());
        }
        for spec in schema.fields {
            match spec.kind {
                FieldKind::Reference { target, key } => {
                    let target_id = record.get(key).and_then(|value| value.as_int());
                    let exists = target_id
                        .is_some_and(|target_id| self.collection(target).rows.contains_key(&target_id));
                    if !exists {
                        return Err(format!("{} not found", capitalize(target.as_str())));
                    }
                }
                FieldKind::Email => {
                    let email = row.get(spec.name).and_then(Value::as_str).unwrap_or_default();
                    let taken = self.collection(schema.kind).rows.iter().any(|(other, existing)| {
                        Some(*other) != id
                            && existing
                                .get(spec.name)
                                .and_then(Value::as_str)
                                .is_some_and(|value| value.eq_ignore_ascii_case(email))
                    });
                    if taken {
                        return Err("Email already exists".to_string());
                    }
                }
                _ => {}
            }
            if spec.access == FieldAccess::UpdateOnly && id.is_some() {
                let value = row.get(spec.name).and_then(Value::as_str).unwrap_or_default();
                if value.is_empty() {
                    return Err(format!("{} should not be empty", spec.name));
                }
            }
        }
        Ok(())
    }

    /// Response form of a row: secrets stripped, references embedded.
    fn present(&self, schema: &EntitySchema, row: &Row) -> Value {
        let mut out = row.clone();
        for spec in schema.fields {
            match (spec.access, spec.kind) {
                (FieldAccess::WriteOnly | FieldAccess::UpdateOnly, _) => {
                    out.remove(spec.name);
                }
                (_, FieldKind::Reference { target, key }) => {
                    let embedded = row
                        .get(key)
                        .and_then(Value::as_i64)
                        .and_then(|target_id| self.collection(target).rows.get(&target_id))
                        .map_or(Value::Null, |target_row| {
                            self.present(target.schema(), target_row)
                        });
                    out.insert(spec.name.to_string(), embedded);
                }
                _ => {}
            }
        }
        Value::Object(out)
    }
}

fn handle_request(
    state: &Mutex<StubState>,
    expected: Option<&str>,
    request: &mut Request,
) -> (u16, Value) {
    if let Some(expected) = expected {
        let header = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Authorization"))
            .map(|header| header.value.as_str().to_string());
        if header.as_deref() != Some(expected) {
            return failure(401, "Unauthorized", "Unauthorized");
        }
    }
    let method = request.method().clone();
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    let body = if matches!(method, Method::Post | Method::Patch) {
        let mut text = String::new();
        if request.as_reader().read_to_string(&mut text).is_err() {
            return failure(400, "Unreadable request body", "Bad Request");
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(_) => return failure(400, "Invalid JSON body", "Bad Request"),
        }
    } else {
        None
    };

    let mut state = state.lock();
    match (&method, segments.as_slice()) {
        (Method::Get, [name]) => state.list(name, &parse_query(query)),
        (Method::Post, [name]) => state.write(name, None, body),
        (Method::Get | Method::Patch | Method::Delete, [name, id]) => {
            let Ok(id) = id.parse::<i64>() else {
                return failure(404, "Route not found", "Not Found");
            };
            match method {
                Method::Get => state.get(name, id),
                Method::Patch => state.write(name, Some(id), body),
                _ => state.delete(name, id),
            }
        }
        _ => failure(404, "Route not found", "Not Found"),
    }
}

fn json_response(status: u16, body: &Value) -> Response<io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}

fn ok<T: Serialize>(status: u16, message: &str, data: T) -> (u16, Value) {
    let body = serde_json::to_value(Envelope::ok(message, data)).unwrap_or(Value::Null);
    (status, body)
}

fn failure(status: u16, message: &str, error: &str) -> (u16, Value) {
    let body = serde_json::to_value(Envelope::failure(message, error)).unwrap_or(Value::Null);
    (status, body)
}

fn not_found(schema: &EntitySchema, id: i64) -> (u16, Value) {
    failure(
        404,
        &format!("{} with id {id} not found", capitalize(schema.title)),
        "Not Found",
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_query(query: &str) -> IndexMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(text: &str) -> String {
    let text = text.replace('+', " ");
    urlencoding::decode(&text).map_or(text.clone(), |decoded| decoded.into_owned())
}

fn positive_param(params: &IndexMap<String, String>, key: &str) -> Option<u64> {
    params
        .get(key)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(text) => text.to_lowercase().contains(needle),
        Value::Number(number) => number.to_string().contains(needle),
        Value::Object(map) => map.values().any(|value| contains_text(value, needle)),
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_components_are_decoded() {
        let params = parse_query("page=2&search=jane%20doe&orderBy[name]=email&orderBy%5Bdirection%5D=desc");
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
        assert_eq!(params.get("search").map(String::as_str), Some("jane doe"));
        assert_eq!(params.get("orderBy[name]").map(String::as_str), Some("email"));
        assert_eq!(
            params.get("orderBy[direction]").map(String::as_str),
            Some("desc")
        );
    }

    #[test]
    fn values_compare_numerically_and_case_insensitively() {
        assert_eq!(
            compare_values(Some(&json!(9)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!("alice")), Some(&json!("Bob"))),
            Ordering::Less
        );
        assert_eq!(compare_values(None, Some(&json!("a"))), Ordering::Less);
    }

    #[test]
    fn search_reaches_embedded_records() {
        let row = json!({"id": 1, "reason": "trip", "employee": {"firstName": "Jane"}});
        assert!(contains_text(&row, "jane"));
        assert!(!contains_text(&row, "omar"));
    }
}
