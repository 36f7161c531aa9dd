//! The validated contact record produced by a successful extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names, in canonical serialization order.
pub const FIELDS: [&str; 3] = ["name", "email", "phone"];

/// Why a candidate mapping could not become a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The candidate is not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// A field is present but not a string.
    #[error("field '{0}' must be a string")]
    NotAString(&'static str),
    /// The name is empty or whitespace.
    #[error("field 'name' must not be empty")]
    EmptyName,
    /// The candidate carries a key outside the record shape.
    #[error("unexpected field '{0}'")]
    UnexpectedField(String),
}

/// A contact record: name, email and phone, all text.
///
/// Only constructed through [`Record::from_fields`] or deserialization of a
/// stored line, so an instance always has all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Person's name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number; format is not checked.
    pub phone: String,
}

impl Record {
    /// Build a record from a candidate JSON mapping.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the value is not an object, a field is
    /// missing or not a string, the name is blank, or an extra key is present.
    pub fn from_fields(candidate: &Value) -> Result<Self, RecordError> {
        let map = candidate
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json_kind(candidate)))?;

        if let Some(extra) = map.keys().find(|k| !FIELDS.contains(&k.as_str())) {
            return Err(RecordError::UnexpectedField(extra.clone()));
        }

        let field = |key: &'static str| -> Result<String, RecordError> {
            match map.get(key) {
                None | Some(Value::Null) => Err(RecordError::MissingField(key)),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(RecordError::NotAString(key)),
            }
        };

        let name = field("name")?;
        let email = field("email")?;
        let phone = field("phone")?;

        if name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }

        Ok(Self { name, email, phone })
    }

    /// Plain JSON object copy, as kept in the conversation log.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
        })
    }

    /// Canonical single-line JSON: `{"name":..,"email":..,"phone":..}`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for string fields.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
