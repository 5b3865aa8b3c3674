//! Annotation type: the descriptor of a user-defined field
//!
//! Studies, collection event types and participants declare annotation
//! types; annotations attached to entities reference them by `uniqueId`.

use crate::domain::errors::BiobankError;
use crate::domain::ids::AnnotationTypeId;
use crate::domain::result::Result;
use crate::domain::schema::{self, Kind, Property, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `maxValueCount` of a non-select type
pub const MAX_VALUE_COUNT_NONE: u32 = 0;

/// `maxValueCount` of a single-select type; anything greater is multiple-select
pub const MAX_VALUE_COUNT_SINGLE: u32 = 1;

/// Schema for a server-side annotation type
pub static ANNOTATION_TYPE_SCHEMA: Schema = Schema {
    id: "AnnotationType",
    properties: &[
        Property::new("uniqueId", Kind::String),
        Property::new("name", Kind::String),
        Property::new("description", Kind::String).nullable(),
        Property::new("valueType", Kind::String),
        Property::new("maxValueCount", Kind::Number).nullable(),
        Property::new("options", Kind::Array),
        Property::new("required", Kind::Boolean),
    ],
    required: &["uniqueId", "name", "valueType", "required"],
};

/// Kind of value an annotation holds
///
/// Unrecognised server values are kept in [`Unknown`](Self::Unknown) so that
/// the annotation factory can reject them with a precise message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnnotationValueType {
    Text,
    Number,
    DateTime,
    Select,
    Unknown(String),
}

impl AnnotationValueType {
    pub fn as_str(&self) -> &str {
        match self {
            AnnotationValueType::Text => "Text",
            AnnotationValueType::Number => "Number",
            AnnotationValueType::DateTime => "DateTime",
            AnnotationValueType::Select => "Select",
            AnnotationValueType::Unknown(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AnnotationValueType::Unknown(_))
    }
}

impl From<String> for AnnotationValueType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Text" => AnnotationValueType::Text,
            "Number" => AnnotationValueType::Number,
            "DateTime" => AnnotationValueType::DateTime,
            "Select" => AnnotationValueType::Select,
            _ => AnnotationValueType::Unknown(value),
        }
    }
}

impl From<AnnotationValueType> for String {
    fn from(value: AnnotationValueType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AnnotationValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor of a custom field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationType {
    /// Assigned by the server when the type is added to its owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<AnnotationTypeId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub value_type: AnnotationValueType,

    /// Only meaningful for select types
    #[serde(default)]
    pub max_value_count: Option<u32>,

    /// Choices offered by a select type, in display order
    #[serde(default)]
    pub options: Vec<String>,

    pub required: bool,
}

impl AnnotationType {
    /// A type not yet attached to any owner
    pub fn new(name: impl Into<String>, value_type: AnnotationValueType, required: bool) -> Self {
        Self {
            unique_id: None,
            name: name.into(),
            description: None,
            value_type,
            max_value_count: None,
            options: Vec::new(),
            required,
        }
    }

    /// Validates and decodes a server annotation type
    pub fn create(obj: Value) -> Result<Self> {
        schema::decode(obj, &ANNOTATION_TYPE_SCHEMA)
    }

    /// Returns the `uniqueId`, which only persisted types have
    pub fn unique_id(&self) -> Result<&AnnotationTypeId> {
        self.unique_id.as_ref().ok_or_else(|| {
            BiobankError::domain(format!("annotation type has no unique ID: {}", self.name))
        })
    }

    pub fn is_value_type_text(&self) -> bool {
        self.value_type == AnnotationValueType::Text
    }

    pub fn is_value_type_number(&self) -> bool {
        self.value_type == AnnotationValueType::Number
    }

    pub fn is_value_type_date_time(&self) -> bool {
        self.value_type == AnnotationValueType::DateTime
    }

    pub fn is_value_type_select(&self) -> bool {
        self.value_type == AnnotationValueType::Select
    }

    pub fn is_single_select(&self) -> bool {
        self.is_value_type_select() && self.max_value_count == Some(MAX_VALUE_COUNT_SINGLE)
    }

    pub fn is_multiple_select(&self) -> bool {
        self.is_value_type_select()
            && matches!(self.max_value_count, Some(n) if n > MAX_VALUE_COUNT_SINGLE)
    }

    /// Select types must be single or multiple; all others must carry "none"
    pub fn is_max_value_count_valid(&self) -> bool {
        if self.is_value_type_select() {
            return self.is_single_select() || self.is_multiple_select();
        }
        matches!(self.max_value_count, None | Some(MAX_VALUE_COUNT_NONE))
    }

    /// Select types must offer at least one option
    pub fn has_valid_options(&self) -> bool {
        !self.is_value_type_select() || !self.options.is_empty()
    }

    /// Label suitable for display
    pub fn value_type_label(&self) -> &'static str {
        match self.value_type {
            AnnotationValueType::Text => "Text",
            AnnotationValueType::Number => "Number",
            AnnotationValueType::DateTime => "Date and time",
            AnnotationValueType::Select if self.is_single_select() => "Single Select",
            AnnotationValueType::Select => "Multiple Select",
            AnnotationValueType::Unknown(_) => "Unknown",
        }
    }

    /// Brings the type back to a consistent state after `value_type` changed
    pub fn value_type_changed(&mut self) {
        if !self.is_value_type_select() {
            self.max_value_count = Some(MAX_VALUE_COUNT_NONE);
            self.options.clear();
        }
    }

    /// Appends a blank option to a select type
    ///
    /// # Errors
    ///
    /// Fails if the type is not a select type.
    pub fn add_option(&mut self) -> Result<()> {
        self.ensure_select()?;
        self.options.push(String::new());
        Ok(())
    }

    /// Removes the option at `index` from a select type
    ///
    /// # Errors
    ///
    /// Fails if the type is not a select type, if it would leave no options,
    /// or if `index` is out of range.
    pub fn remove_option(&mut self, index: usize) -> Result<()> {
        self.ensure_select()?;
        if self.options.len() <= 1 {
            return Err(BiobankError::domain("cannot remove last option"));
        }
        if index >= self.options.len() {
            return Err(BiobankError::domain(format!(
                "option index out of range: {index}"
            )));
        }
        self.options.remove(index);
        Ok(())
    }

    /// Returns true if every value in `values` is one of the declared options
    pub fn valid_options<S: AsRef<str>>(&self, values: &[S]) -> bool {
        values
            .iter()
            .all(|value| self.options.iter().any(|option| option == value.as_ref()))
    }

    fn ensure_select(&self) -> Result<()> {
        if !self.is_value_type_select() {
            return Err(BiobankError::domain(format!(
                "value type is not select: {}",
                self.value_type
            )));
        }
        Ok(())
    }
}
