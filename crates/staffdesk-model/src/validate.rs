//! Local form validation.
//!
//! Runs entirely client side, before any request is built. Fields missing from
//! the draft are validated as their declared default.

use std::fmt;

use smol_str::SmolStr;

use crate::record::FieldValue;
use crate::schema::{EntitySchema, FieldAccess, FieldKind, FieldSpec};
use crate::Record;

/// A rule failure scoped to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as declared by the schema.
    pub field: SmolStr,
    /// Human readable reason.
    pub message: SmolStr,
}

impl FieldError {
    /// Builds an error for `field`.
    pub fn new(field: impl Into<SmolStr>, message: impl Into<SmolStr>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates `draft` against `schema`. Errors come back in field declaration
/// order; an empty vector means the draft may be submitted.
#[must_use]
pub fn validate(schema: &EntitySchema, draft: &Record) -> Vec<FieldError> {
    let draft = schema.with_defaults(draft);
    schema
        .fields
        .iter()
        .filter(|spec| spec.access != FieldAccess::ReadOnly)
        .filter_map(|spec| {
            let message = match draft.get(spec.name) {
                Some(value) => check_field(spec, value),
                None => check_field(spec, &FieldValue::Null),
            };
            message.map(|message| FieldError::new(spec.name, message))
        })
        .collect()
}

fn check_field(spec: &FieldSpec, value: &FieldValue) -> Option<String> {
    if value.is_null() {
        if spec.required {
            return Some(required_message(spec));
        }
        // Text-like rules still apply to a cleared field.
        return match spec.kind {
            FieldKind::Email | FieldKind::Choice(_) | FieldKind::Text => {
                check_field(spec, &FieldValue::from(""))
            }
            FieldKind::Integer | FieldKind::Date | FieldKind::Reference { .. } => None,
        };
    }
    match spec.kind {
        FieldKind::Integer => {
            let Some(number) = value.as_int() else {
                return Some("Expected number".to_string());
            };
            if spec.required && number < 1 {
                return Some(
                    spec.message
                        .map_or_else(|| "Number must be at least 1".to_string(), String::from),
                );
            }
            None
        }
        FieldKind::Date => value
            .as_date()
            .is_none()
            .then(|| "Invalid date".to_string()),
        FieldKind::Choice(options) => {
            let text = value.as_text().unwrap_or_default();
            (!options.contains(&text)).then(|| {
                let expected = options
                    .iter()
                    .map(|option| format!("'{option}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!("Invalid enum value. Expected {expected}")
            })
        }
        FieldKind::Email => {
            let text = value.as_text().unwrap_or_default();
            (!is_well_formed_email(text)).then(|| "Invalid email".to_string())
        }
        FieldKind::Text => {
            let Some(text) = value.as_text() else {
                return Some("Expected string".to_string());
            };
            check_length(spec, text)
        }
        FieldKind::Reference { .. } => None,
    }
}

fn check_length(spec: &FieldSpec, text: &str) -> Option<String> {
    let min = spec.min_len?;
    if text.chars().count() >= min {
        return None;
    }
    Some(spec.message.map_or_else(
        || format!("String must contain at least {min} character(s)"),
        String::from,
    ))
}

fn required_message(spec: &FieldSpec) -> String {
    spec.message
        .map_or_else(|| format!("{} is required.", spec.label), String::from)
}

/// `local@domain.tld` with no whitespace and a dotted domain.
#[must_use]
pub fn is_well_formed_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EMPLOYEE, LEAVE, USER};
    use time::{Date, Month};

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|err| err.field.as_str()).collect()
    }

    #[test]
    fn employee_reports_short_name_and_bad_email() {
        let draft = Record::new()
            .with("firstName", "A")
            .with("lastName", "Doe")
            .with("email", "bad")
            .with("phoneNumber", "123456");
        let errors = validate(&EMPLOYEE, &draft);
        assert_eq!(fields(&errors), ["firstName", "email"]);
        assert_eq!(
            errors[0].message,
            "First name must be at least 2 characters."
        );
        assert_eq!(errors[1].message, "Invalid email");
    }

    #[test]
    fn complete_employee_passes() {
        let draft = Record::new()
            .with("firstName", "Jane")
            .with("lastName", "Doe")
            .with("email", "jane@x.com")
            .with("phoneNumber", "5551212")
            .with("address", "1 Main St")
            .with("gender", "FEMALE");
        assert!(validate(&EMPLOYEE, &draft).is_empty());
    }

    #[test]
    fn employee_address_may_be_null_but_gender_must_be_known() {
        let draft = Record::new()
            .with("firstName", "Jane")
            .with("lastName", "Doe")
            .with("email", "jane@x.com")
            .with("phoneNumber", "5551212")
            .with("address", FieldValue::Null)
            .with("gender", "OTHER");
        let errors = validate(&EMPLOYEE, &draft);
        assert_eq!(fields(&errors), ["gender"]);
        assert_eq!(
            errors[0].message,
            "Invalid enum value. Expected 'MALE' | 'FEMALE'"
        );
    }

    #[test]
    fn user_requires_password_length_and_birth_date() {
        let draft = Record::new()
            .with("firstName", "Jane")
            .with("lastName", "Doe")
            .with("email", "jane@x.com")
            .with("password", "12345");
        let errors = validate(&USER, &draft);
        assert_eq!(fields(&errors), ["password", "birthDate"]);
        assert_eq!(
            errors[0].message,
            "String must contain at least 6 character(s)"
        );
        assert_eq!(errors[1].message, "A date of birth is required.");

        let birth = Date::from_calendar_date(1990, Month::July, 4).expect("date");
        let draft = draft.with("password", "123456").with("birthDate", birth);
        assert!(validate(&USER, &draft).is_empty());
    }

    #[test]
    fn leave_requires_employee_and_both_dates_but_not_their_order() {
        let errors = validate(&LEAVE, &Record::new());
        assert_eq!(fields(&errors), ["employeeId", "startDate", "endDate"]);

        let start = Date::from_calendar_date(2024, Month::June, 10).expect("date");
        let end = Date::from_calendar_date(2024, Month::June, 1).expect("date");
        let draft = Record::new()
            .with("employeeId", 3_i64)
            .with("startDate", start)
            .with("endDate", end);
        assert!(validate(&LEAVE, &draft).is_empty());

        let draft = draft.with("employeeId", 0_i64);
        assert_eq!(fields(&validate(&LEAVE, &draft)), ["employeeId"]);
    }

    #[test]
    fn null_values_do_not_skip_the_text_rules() {
        let draft = Record::new()
            .with("firstName", FieldValue::Null)
            .with("lastName", FieldValue::Null)
            .with("email", FieldValue::Null)
            .with("phoneNumber", FieldValue::Null)
            .with("address", FieldValue::Null)
            .with("gender", FieldValue::Null);
        let errors = validate(&EMPLOYEE, &draft);
        assert_eq!(
            fields(&errors),
            ["firstName", "lastName", "email", "phoneNumber", "gender"]
        );
        assert_eq!(errors[2].message, "Invalid email");

        let birth = Date::from_calendar_date(1990, Month::July, 4).expect("date");
        let draft = Record::new()
            .with("firstName", "Jane")
            .with("lastName", "Doe")
            .with("email", "jane@x.com")
            .with("password", FieldValue::Null)
            .with("birthDate", birth);
        let errors = validate(&USER, &draft);
        assert_eq!(fields(&errors), ["password"]);
        assert_eq!(
            errors[0].message,
            "String must contain at least 6 character(s)"
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_well_formed_email("jane@x.com"));
        assert!(is_well_formed_email("a.b+c@mail.example.org"));
        assert!(!is_well_formed_email("bad"));
        assert!(!is_well_formed_email("@x.com"));
        assert!(!is_well_formed_email("jane@x"));
        assert!(!is_well_formed_email("jane@x..com"));
        assert!(!is_well_formed_email("ja ne@x.com"));
        assert!(!is_well_formed_email("a@b@c.com"));
    }
}
