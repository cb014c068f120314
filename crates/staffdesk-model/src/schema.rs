//! Entity schemas for the managed collections.
//!
//! One [`EntitySchema`] per collection describes its fields. Controllers and
//! the HTTP client are generic over the schema, so employees, leaves, and users
//! share a single implementation.

#![allow(missing_docs)]

use std::fmt;

use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::error::ModelError;
use crate::record::{parse_date, FieldValue, Record};

/// Accepted values of every `gender` field.
pub const GENDERS: &[&str] = &["MALE", "FEMALE"];

/// The managed collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Leave,
    User,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Employee, Self::Leave, Self::User];

    /// Accepts singular or plural names, case-insensitive.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "employee" | "employees" => Ok(Self::Employee),
            "leave" | "leaves" => Ok(Self::Leave),
            "user" | "users" => Ok(Self::User),
            _ => Err(ModelError::UnknownEntity(SmolStr::new(text))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.schema().title
    }

    #[must_use]
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::Employee => &EMPLOYEE,
            Self::Leave => &LEAVE,
            Self::User => &USER,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Email,
    Date,
    Choice(&'static [&'static str]),
    /// Embedded record of another collection; `key` is the sibling field that
    /// carries its id on submission.
    Reference {
        target: EntityKind,
        key: &'static str,
    },
}

/// Value a fresh form starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Null,
    Text(&'static str),
}

impl FieldDefault {
    #[must_use]
    pub fn value(self) -> FieldValue {
        match self {
            Self::Null => FieldValue::Null,
            Self::Text(text) => FieldValue::from(text),
        }
    }
}

/// Where a field flows between the backend and a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// Prefilled on edit, sent on create and update.
    ReadWrite,
    /// Sent on create and update, never prefilled (passwords).
    WriteOnly,
    /// Sent on update only, never prefilled.
    UpdateOnly,
    /// Display only; never sent.
    ReadOnly,
}

/// Which submission a payload is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    Create,
    Update,
}

/// Declaration of one entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: Option<usize>,
    /// Replaces the generic message for `required` and `min_len` failures.
    pub message: Option<&'static str>,
    pub default: FieldDefault,
    pub access: FieldAccess,
    /// Shown (and sortable, unless a reference) in list tables.
    pub column: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            min_len: None,
            message: None,
            default: FieldDefault::Null,
            access: FieldAccess::ReadWrite,
            column: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    const fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    const fn default_text(mut self, text: &'static str) -> Self {
        self.default = FieldDefault::Text(text);
        self
    }

    const fn access(mut self, access: FieldAccess) -> Self {
        self.access = access;
        self
    }

    const fn column(mut self) -> Self {
        self.column = true;
        self
    }

    /// Typed decode of one backend value.
    pub fn decode(&self, raw: &Value) -> Result<FieldValue, ModelError> {
        match (self.kind, raw) {
            (FieldKind::Date, Value::String(text)) => Ok(parse_date(text)
                .map_or_else(|| FieldValue::from(text.as_str()), FieldValue::Date)),
            (FieldKind::Integer, Value::String(text)) => Ok(text
                .trim()
                .parse::<i64>()
                .map_or_else(|_| FieldValue::from(text.as_str()), FieldValue::Int)),
            (FieldKind::Reference { target, .. }, Value::Object(_)) => {
                target.schema().decode(raw).map(FieldValue::from)
            }
            _ => Ok(FieldValue::from_json(raw)),
        }
    }

    /// Parses user-typed text. Blank integer/date input clears the field.
    pub fn parse_input(&self, text: &str) -> Result<FieldValue, ModelError> {
        let invalid = |message: &str| ModelError::InvalidInput {
            field: SmolStr::new(self.name),
            message: SmolStr::new(message),
        };
        if matches!(self.access, FieldAccess::ReadOnly) {
            return Err(ModelError::ReadOnlyField(SmolStr::new(self.name)));
        }
        let trimmed = text.trim();
        match self.kind {
            FieldKind::Integer if trimmed.is_empty() => Ok(FieldValue::Null),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| invalid("expected an integer")),
            FieldKind::Date if trimmed.is_empty() => Ok(FieldValue::Null),
            FieldKind::Date => parse_date(trimmed)
                .filter(|_| trimmed.len() == 10)
                .map(FieldValue::Date)
                .ok_or_else(|| invalid("expected a date (YYYY-MM-DD)")),
            FieldKind::Choice(_) => Ok(FieldValue::from(trimmed.to_ascii_uppercase())),
            FieldKind::Text | FieldKind::Email => Ok(FieldValue::from(text)),
            FieldKind::Reference { .. } => Err(ModelError::ReadOnlyField(SmolStr::new(self.name))),
        }
    }

    fn sent_in(&self, mode: PayloadMode) -> bool {
        match self.access {
            FieldAccess::ReadWrite | FieldAccess::WriteOnly => true,
            FieldAccess::UpdateOnly => mode == PayloadMode::Update,
            FieldAccess::ReadOnly => false,
        }
    }
}

/// Field list and endpoint path of one managed collection.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Backend collection path segment (`employees`).
    pub collection: &'static str,
    /// Singular display name (`employee`).
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// Fields joined to label a record in pick lists.
    pub label_fields: &'static [&'static str],
    /// Appended in parentheses to pick-list labels to tell namesakes apart.
    pub option_detail: Option<&'static str>,
}

impl EntitySchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FieldSpec, ModelError> {
        self.field(name).ok_or_else(|| ModelError::UnknownField {
            entity: self.title,
            field: SmolStr::new(name),
        })
    }

    /// Fields shown in list tables, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| spec.column)
    }

    #[must_use]
    pub fn is_sortable(&self, name: &str) -> bool {
        self.field(name).is_some_and(|spec| {
            spec.column && !matches!(spec.kind, FieldKind::Reference { .. })
        })
    }

    /// Fresh form buffer: every editable field at its declared default.
    #[must_use]
    pub fn defaults(&self) -> Record {
        let mut record = Record::new();
        for spec in self.fields {
            if spec.access != FieldAccess::ReadOnly {
                record.set(spec.name, spec.default.value());
            }
        }
        record
    }

    /// `draft` overlaid on the defaults, so absent fields read as their default.
    #[must_use]
    pub fn with_defaults(&self, draft: &Record) -> Record {
        let mut record = self.defaults();
        for (name, value) in draft.iter() {
            record.set(name, value.clone());
        }
        record
    }

    /// Decodes a backend JSON object, typing dates, integers, and references.
    pub fn decode(&self, value: &Value) -> Result<Record, ModelError> {
        let Value::Object(map) = value else {
            return Err(ModelError::MalformedRecord(
                format!("expected {} object, got {value}", self.title).into(),
            ));
        };
        let mut record = Record::new();
        for (name, raw) in map {
            let value = match self.field(name) {
                Some(spec) => spec.decode(raw)?,
                None => FieldValue::from_json(raw),
            };
            record.set(name.as_str(), value);
        }
        Ok(record)
    }

    /// Request body for create/update: sendable fields only, never `id`.
    #[must_use]
    pub fn encode_payload(&self, record: &Record, mode: PayloadMode) -> Value {
        let mut map = Map::new();
        for spec in self.fields.iter().filter(|spec| spec.sent_in(mode)) {
            let value = record
                .get(spec.name)
                .cloned()
                .unwrap_or_else(|| spec.default.value());
            map.insert(spec.name.to_string(), value.to_json());
        }
        Value::Object(map)
    }

    pub fn parse_input(&self, name: &str, text: &str) -> Result<FieldValue, ModelError> {
        self.require_field(name)?.parse_input(text)
    }

    /// Edit buffer for a fetched record. Write-only fields keep their
    /// defaults; references also populate their key field.
    #[must_use]
    pub fn prefill(&self, fetched: &Record) -> Record {
        let mut buffer = self.defaults();
        for spec in self.fields {
            let Some(value) = fetched.get(spec.name) else {
                continue;
            };
            if let FieldKind::Reference { key, .. } = spec.kind {
                if let Some(id) = value.as_record().and_then(Record::id) {
                    buffer.set(key, id);
                }
                buffer.set(spec.name, value.clone());
                continue;
            }
            if matches!(spec.access, FieldAccess::ReadWrite | FieldAccess::ReadOnly) {
                buffer.set(spec.name, value.clone());
            }
        }
        buffer
    }

    /// Human label for pick lists (`"Jane Doe"`), `#id` when no label fields.
    #[must_use]
    pub fn display_label(&self, record: &Record) -> String {
        let parts: Vec<String> = self
            .label_fields
            .iter()
            .filter_map(|name| record.get(name))
            .map(ToString::to_string)
            .filter(|part| !part.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        record
            .id()
            .map_or_else(|| "-".to_string(), |id| format!("#{id}"))
    }

    /// Pick-list entry text: `"Jane Doe (jane@example.com)"`.
    #[must_use]
    pub fn option_label(&self, record: &Record) -> String {
        let label = self.display_label(record);
        let detail = self
            .option_detail
            .and_then(|name| record.get(name))
            .map(ToString::to_string)
            .filter(|detail| !detail.is_empty());
        match detail {
            Some(detail) => format!("{label} ({detail})"),
            None => label,
        }
    }
}

const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "ID", FieldKind::Integer)
        .access(FieldAccess::ReadOnly)
        .column(),
    FieldSpec::new("firstName", "First Name", FieldKind::Text)
        .min_len(2)
        .message("First name must be at least 2 characters.")
        .default_text("")
        .column(),
    FieldSpec::new("lastName", "Last Name", FieldKind::Text)
        .min_len(2)
        .message("Last name must be at least 2 characters.")
        .default_text("")
        .column(),
    FieldSpec::new("email", "Email", FieldKind::Email)
        .default_text("")
        .column(),
    FieldSpec::new("phoneNumber", "Phone Number", FieldKind::Text)
        .min_len(6)
        .default_text("")
        .column(),
    FieldSpec::new("address", "Address", FieldKind::Text).default_text(""),
    FieldSpec::new("gender", "Gender", FieldKind::Choice(GENDERS))
        .default_text("MALE")
        .column(),
];

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "ID", FieldKind::Integer)
        .access(FieldAccess::ReadOnly)
        .column(),
    FieldSpec::new("firstName", "First Name", FieldKind::Text)
        .min_len(2)
        .message("First name must be at least 2 characters.")
        .default_text("")
        .column(),
    FieldSpec::new("lastName", "Last Name", FieldKind::Text)
        .min_len(2)
        .message("Last name must be at least 2 characters.")
        .default_text("")
        .column(),
    FieldSpec::new("email", "Email", FieldKind::Email)
        .default_text("")
        .column(),
    FieldSpec::new("password", "Password", FieldKind::Text)
        .min_len(6)
        .default_text("")
        .access(FieldAccess::WriteOnly),
    FieldSpec::new("currentPassword", "Current Password", FieldKind::Text)
        .default_text("")
        .access(FieldAccess::UpdateOnly),
    FieldSpec::new("birthDate", "Birth Date", FieldKind::Date)
        .required()
        .message("A date of birth is required.")
        .column(),
    FieldSpec::new("gender", "Gender", FieldKind::Choice(GENDERS))
        .default_text("MALE")
        .column(),
];

const LEAVE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "ID", FieldKind::Integer)
        .access(FieldAccess::ReadOnly)
        .column(),
    FieldSpec::new(
        "employee",
        "Employee",
        FieldKind::Reference {
            target: EntityKind::Employee,
            key: "employeeId",
        },
    )
    .access(FieldAccess::ReadOnly)
    .column(),
    FieldSpec::new("employeeId", "Employee ID", FieldKind::Integer)
        .required()
        .message("Employee is required."),
    FieldSpec::new("startDate", "Start Date", FieldKind::Date)
        .required()
        .message("A start date is required.")
        .column(),
    FieldSpec::new("endDate", "End Date", FieldKind::Date)
        .required()
        .message("An end date is required.")
        .column(),
    FieldSpec::new("reason", "Reason", FieldKind::Text)
        .default_text("")
        .column(),
];

pub static EMPLOYEE: EntitySchema = EntitySchema {
    kind: EntityKind::Employee,
    collection: "employees",
    title: "employee",
    fields: EMPLOYEE_FIELDS,
    label_fields: &["firstName", "lastName"],
    option_detail: Some("email"),
};

pub static LEAVE: EntitySchema = EntitySchema {
    kind: EntityKind::Leave,
    collection: "leaves",
    title: "leave",
    fields: LEAVE_FIELDS,
    label_fields: &[],
    option_detail: None,
};

pub static USER: EntitySchema = EntitySchema {
    kind: EntityKind::User,
    collection: "users",
    title: "user",
    fields: USER_FIELDS,
    label_fields: &["firstName", "lastName"],
    option_detail: Some("email"),
};
