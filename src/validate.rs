//! Field validation of the school form

use regex::Regex;
use school_directory_common::SchoolFields;
use std::fmt;

/// Form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Address,
    City,
    State,
    Contact,
    EmailId,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Address,
        Field::City,
        Field::State,
        Field::Contact,
        Field::EmailId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::Contact => "contact",
            Field::EmailId => "email_id",
        }
    }

    fn required_message(&self) -> &'static str {
        match self {
            Field::Name => "School name is required",
            Field::Address => "Address is required",
            Field::City => "City is required",
            Field::State => "State is required",
            Field::Contact => "Contact is required",
            Field::EmailId => "Email is required",
        }
    }

    /// Read this field out of a payload
    pub fn get<'a>(&self, fields: &'a SchoolFields) -> &'a str {
        match self {
            Field::Name => &fields.name,
            Field::Address => &fields.address,
            Field::City => &fields.city,
            Field::State => &fields.state,
            Field::Contact => &fields.contact,
            Field::EmailId => &fields.email_id,
        }
    }

    /// Write this field into a payload
    pub fn set(&self, fields: &mut SchoolFields, value: String) {
        match self {
            Field::Name => fields.name = value,
            Field::Address => fields.address = value,
            Field::City => fields.city = value,
            Field::State => fields.state = value,
            Field::Contact => fields.contact = value,
            Field::EmailId => fields.email_id = value,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate one field value. Returns the message to show next to it.
pub fn validate_field(field: Field, value: &str) -> Option<&'static str> {
    lazy_static::lazy_static! {
        // 10 digits, leading 6-9
        static ref CONTACT_RE: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }

    if value.trim().is_empty() {
        return Some(field.required_message());
    }

    match field {
        Field::Contact if !CONTACT_RE.is_match(value) => Some("Enter a valid 10-digit number"),
        Field::EmailId if !EMAIL_RE.is_match(value) => Some("Enter a valid email address"),
        _ => None,
    }
}

/// Per-field failures, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push((field, message));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate every field of a payload.
pub fn validate_fields(fields: &SchoolFields) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for field in Field::ALL {
        if let Some(message) = validate_field(field, field.get(fields)) {
            errors.push(field, message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
