//! Structural validation of plain JSON objects
//!
//! Every entity factory checks the server's reply against a declarative
//! [`Schema`] before decoding it. A schema lists its properties with their
//! JSON kind, whether `null` is accepted, and which keys must be present.
//! Sub-schemas are referenced by address so that a shape such as
//! `CentreLocationInfo` is declared once and reused by every entity that
//! embeds it.
//!
//! # Example
//!
//! ```
//! use biobank::domain::schema::{validate, Kind, Property, Schema};
//! use serde_json::json;
//!
//! static POINT: Schema = Schema {
//!     id: "Point",
//!     properties: &[
//!         Property::new("x", Kind::Integer),
//!         Property::new("label", Kind::String).nullable(),
//!     ],
//!     required: &["x"],
//! };
//!
//! assert!(validate(&json!({ "x": 1, "label": null }), &POINT).is_ok());
//!
//! let err = validate(&json!({ "label": "a" }), &POINT).unwrap_err();
//! assert_eq!(err.to_string(), "Point.x: missing required property");
//! ```

use super::errors::BiobankError;
use super::result::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// JSON kind expected for a property
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    String,
    /// Whole number; a float with no fractional part is accepted
    Integer,
    Number,
    Boolean,
    /// Array with unchecked items
    Array,
    /// Object with unchecked members
    Object,
    /// Object that must satisfy a named sub-schema
    Ref(&'static Schema),
    /// Array whose every item must satisfy a named sub-schema
    ArrayOf(&'static Schema),
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Array | Kind::ArrayOf(_) => "array",
            Kind::Object | Kind::Ref(_) => "object",
        }
    }
}

/// A single declared property
#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub kind: Kind,
    pub nullable: bool,
    pub minimum: Option<i64>,
}

impl Property {
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            minimum: None,
        }
    }

    /// Accept `null` in addition to the declared kind
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Lower bound for integer properties
    pub const fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// A named object shape
#[derive(Debug)]
pub struct Schema {
    pub id: &'static str,
    pub properties: &'static [Property],
    pub required: &'static [&'static str],
}

/// Describes the first validation failure found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaError {
    /// Dotted path to the failing value, starting with the schema id
    pub path: String,
    pub reason: String,
}

impl SchemaError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Validates `value` against `schema`
///
/// # Errors
///
/// Returns the first failure: a missing required key, a value of the wrong
/// kind, an unexpected `null`, an integer below its minimum, or any failure
/// inside a referenced sub-schema.
pub fn validate(value: &Value, schema: &Schema) -> std::result::Result<(), SchemaError> {
    validate_at(value, schema, schema.id)
}

/// Returns true if `value` satisfies `schema`
pub fn is_valid(value: &Value, schema: &Schema) -> bool {
    validate(value, schema).is_ok()
}

fn validate_at(
    value: &Value,
    schema: &Schema,
    path: &str,
) -> std::result::Result<(), SchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, format!("expected object, found {}", kind_of(value))))?;

    for key in schema.required {
        if !object.contains_key(*key) {
            return Err(SchemaError::new(
                format!("{path}.{key}"),
                "missing required property",
            ));
        }
    }

    for property in schema.properties {
        let Some(member) = object.get(property.name) else {
            continue;
        };
        let member_path = format!("{path}.{}", property.name);

        if member.is_null() {
            if property.nullable {
                continue;
            }
            return Err(SchemaError::new(
                member_path,
                format!("expected {}, found null", property.kind.name()),
            ));
        }

        check_kind(member, property, &member_path)?;
    }

    Ok(())
}

fn check_kind(
    value: &Value,
    property: &Property,
    path: &str,
) -> std::result::Result<(), SchemaError> {
    let mismatch = || {
        SchemaError::new(
            path,
            format!("expected {}, found {}", property.kind.name(), kind_of(value)),
        )
    };

    match property.kind {
        Kind::String if !value.is_string() => Err(mismatch()),
        Kind::Number if !value.is_number() => Err(mismatch()),
        Kind::Boolean if !value.is_boolean() => Err(mismatch()),
        Kind::Array if !value.is_array() => Err(mismatch()),
        Kind::Object if !value.is_object() => Err(mismatch()),
        Kind::Integer => {
            let whole = value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(mismatch)?;
            match property.minimum {
                Some(minimum) if whole < minimum => Err(SchemaError::new(
                    path,
                    format!("value {whole} is less than minimum {minimum}"),
                )),
                _ => Ok(()),
            }
        }
        Kind::Ref(sub) => validate_at(value, sub, path),
        Kind::ArrayOf(sub) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .enumerate()
                .try_for_each(|(index, item)| validate_at(item, sub, &format!("{path}[{index}]")))
        }
        _ => Ok(()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validates `value` against `schema` and decodes it
///
/// Both a structural failure and a decoding failure (for example an
/// unparsable timestamp) are logged and reported as
/// [`BiobankError::InvalidServerObject`].
pub fn decode<T: DeserializeOwned>(value: Value, schema: &Schema) -> Result<T> {
    if let Err(e) = validate(&value, schema) {
        crate::log_invalid_server_object!(schema.id, e);
        return Err(BiobankError::InvalidServerObject(e.to_string()));
    }

    serde_json::from_value(value).map_err(|e| {
        let detail = format!("{}: {e}", schema.id);
        crate::log_invalid_server_object!(schema.id, detail);
        BiobankError::InvalidServerObject(detail)
    })
}
