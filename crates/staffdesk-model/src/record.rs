//! Field values and entity records.

#![allow(missing_docs)]

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use smol_str::SmolStr;
use time::macros::format_description;
use time::Date;

/// A single scalar (or embedded reference) held by a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(SmolStr),
    Date(Date),
    /// Read-only embedded foreign record (a leave's employee).
    Record(Box<Record>),
}

impl FieldValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Converts a JSON value without schema knowledge. Dates stay text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(text) => Self::Text(SmolStr::new(text)),
            Value::Object(map) => Self::Record(Box::new(Record::from_json_object(map))),
            Value::Array(_) => Self::Text(SmolStr::new(value.to_string())),
        }
    }

    /// Wire form. Dates are sent as midnight UTC timestamps.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Int(value) => Value::Number((*value).into()),
            Self::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::Text(text) => Value::String(text.to_string()),
            Self::Date(date) => Value::String(format!("{}T00:00:00.000Z", format_date(*date))),
            Self::Record(record) => record.to_json(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => f.write_str(&format_date(*date)),
            Self::Record(record) => match record.id() {
                Some(id) => write!(f, "#{id}"),
                None => f.write_str("-"),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(SmolStr::new(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(SmolStr::new(value))
    }
}

impl From<SmolStr> for FieldValue {
    fn from(value: SmolStr) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        Self::Record(Box::new(value))
    }
}

/// Parses `YYYY-MM-DD`, ignoring any time suffix (`2024-03-01T00:00:00.000Z`).
#[must_use]
pub fn parse_date(text: &str) -> Option<Date> {
    let head = text.trim().get(..10)?;
    Date::parse(head, format_description!("[year]-[month]-[day]")).ok()
}

#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// One row of a managed collection: an ordered field map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<SmolStr, FieldValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<SmolStr>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<SmolStr>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The record identifier, when present and integral.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(FieldValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn from_json_object(map: &Map<String, Value>) -> Self {
        let fields = map
            .iter()
            .map(|(name, value)| (SmolStr::new(name), FieldValue::from_json(value)))
            .collect();
        Self { fields }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self
            .fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}
