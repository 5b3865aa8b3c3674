//! Annotation values and their server form

use super::annotation_type::{AnnotationType, AnnotationValueType};
use crate::domain::errors::BiobankError;
use crate::domain::ids::AnnotationTypeId;
use crate::domain::result::Result;
use crate::domain::schema::{self, Kind, Property, Schema};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema for an annotation as exchanged with the server
pub static ANNOTATION_SCHEMA: Schema = Schema {
    id: "Annotation",
    properties: &[
        Property::new("annotationTypeId", Kind::String),
        Property::new("stringValue", Kind::String).nullable(),
        Property::new("numberValue", Kind::String).nullable(),
        Property::new("selectedValues", Kind::Array),
    ],
    required: &["annotationTypeId", "selectedValues"],
};

/// Annotation in the shape the server stores it
///
/// Numbers travel as strings and date-times as RFC 3339 strings in
/// `stringValue`. `selectedValues` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerAnnotation {
    pub annotation_type_id: AnnotationTypeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<String>,

    #[serde(default)]
    pub selected_values: Vec<String>,
}

impl ServerAnnotation {
    pub fn create(obj: Value) -> Result<Self> {
        schema::decode(obj, &ANNOTATION_SCHEMA)
    }
}

/// Value held by an annotation, one variant per kind
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Text(Option<String>),
    Number(Option<f64>),
    DateTime(Option<DateTime<Utc>>),
    SingleSelect(Option<String>),
    MultipleSelect(Vec<String>),
}

impl AnnotationValue {
    fn kind(&self) -> &'static str {
        match self {
            AnnotationValue::Text(_) => "text",
            AnnotationValue::Number(_) => "number",
            AnnotationValue::DateTime(_) => "date and time",
            AnnotationValue::SingleSelect(_) => "single select",
            AnnotationValue::MultipleSelect(_) => "multiple select",
        }
    }

    fn same_kind(&self, other: &AnnotationValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A value instance of an [`AnnotationType`] attached to an entity
///
/// # Example
///
/// ```
/// use biobank::domain::annotations::{Annotation, AnnotationType, AnnotationValue, AnnotationValueType};
/// use biobank::domain::ids::AnnotationTypeId;
///
/// let mut at = AnnotationType::new("Colour", AnnotationValueType::Select, true);
/// at.unique_id = Some(AnnotationTypeId::new("at1").unwrap());
/// at.max_value_count = Some(1);
/// at.options = vec!["a".to_string(), "b".to_string()];
///
/// let mut annotation = Annotation::create(None, &at).unwrap();
/// assert!(!annotation.is_value_valid());
///
/// annotation.set_value(AnnotationValue::SingleSelect(Some("a".to_string()))).unwrap();
/// assert!(annotation.is_value_valid());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    annotation_type_id: AnnotationTypeId,
    annotation_type: AnnotationType,
    required: bool,
    value: AnnotationValue,
}

impl Annotation {
    /// Builds the annotation variant matching `annotation_type`
    ///
    /// `server` supplies the stored value, if any; without it the annotation
    /// starts empty.
    ///
    /// # Errors
    ///
    /// Fails with "invalid value type" for an unknown value type, with
    /// "select type has no options" for a select type without options, with
    /// "invalid max count" for a select type that is neither single nor
    /// multiple, and with an invalid-server-object error for a stored value
    /// that cannot be parsed.
    pub fn create(server: Option<&ServerAnnotation>, annotation_type: &AnnotationType) -> Result<Self> {
        let annotation_type_id = annotation_type.unique_id()?.clone();

        let value = match &annotation_type.value_type {
            AnnotationValueType::Text => {
                AnnotationValue::Text(server.and_then(|s| non_empty(&s.string_value)))
            }
            AnnotationValueType::Number => {
                let number = match server.and_then(|s| non_empty(&s.number_value)) {
                    Some(raw) => Some(raw.trim().parse::<f64>().map_err(|_| {
                        BiobankError::InvalidServerObject(format!(
                            "Annotation.numberValue: not a number: {raw}"
                        ))
                    })?),
                    None => None,
                };
                AnnotationValue::Number(number)
            }
            AnnotationValueType::DateTime => {
                let datetime = match server.and_then(|s| non_empty(&s.string_value)) {
                    Some(raw) => Some(
                        DateTime::parse_from_rfc3339(&raw)
                            .map_err(|_| {
                                BiobankError::InvalidServerObject(format!(
                                    "Annotation.stringValue: not a date and time: {raw}"
                                ))
                            })?
                            .with_timezone(&Utc),
                    ),
                    None => None,
                };
                AnnotationValue::DateTime(datetime)
            }
            AnnotationValueType::Select => {
                if !annotation_type.has_valid_options() {
                    return Err(BiobankError::domain(format!(
                        "select type has no options: {}",
                        annotation_type.name
                    )));
                }
                let selected = server.map(|s| s.selected_values.clone()).unwrap_or_default();
                if annotation_type.is_single_select() {
                    AnnotationValue::SingleSelect(selected.into_iter().next())
                } else if annotation_type.is_multiple_select() {
                    AnnotationValue::MultipleSelect(selected)
                } else {
                    return Err(BiobankError::domain(format!(
                        "invalid max count: {:?}",
                        annotation_type.max_value_count
                    )));
                }
            }
            AnnotationValueType::Unknown(other) => {
                return Err(BiobankError::domain(format!("invalid value type: {other}")));
            }
        };

        Ok(Self {
            annotation_type_id,
            annotation_type: annotation_type.clone(),
            required: annotation_type.required,
            value,
        })
    }

    pub fn annotation_type_id(&self) -> &AnnotationTypeId {
        &self.annotation_type_id
    }

    pub fn annotation_type(&self) -> &AnnotationType {
        &self.annotation_type
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Name of the annotation type, for display
    pub fn label(&self) -> &str {
        &self.annotation_type.name
    }

    pub fn value_type(&self) -> &AnnotationValueType {
        &self.annotation_type.value_type
    }

    pub fn value(&self) -> &AnnotationValue {
        &self.value
    }

    /// Replaces the value
    ///
    /// # Errors
    ///
    /// Rejects a value of a different kind than this annotation's, and
    /// select values that are not among the type's options.
    pub fn set_value(&mut self, value: AnnotationValue) -> Result<()> {
        if !self.value.same_kind(&value) {
            return Err(BiobankError::domain(format!(
                "{} annotation cannot hold a {} value",
                self.value.kind(),
                value.kind()
            )));
        }

        let selected: &[String] = match &value {
            AnnotationValue::SingleSelect(Some(v)) => std::slice::from_ref(v),
            AnnotationValue::MultipleSelect(values) => values,
            _ => &[],
        };
        if !self.annotation_type.valid_options(selected) {
            return Err(BiobankError::domain(format!(
                "value not among the options of {}",
                self.annotation_type.name
            )));
        }

        self.value = value;
        Ok(())
    }

    /// False only when a required annotation has no usable value
    pub fn is_value_valid(&self) -> bool {
        if !self.required {
            return true;
        }
        match &self.value {
            AnnotationValue::Text(v) | AnnotationValue::SingleSelect(v) => {
                v.as_deref().is_some_and(|s| !s.trim().is_empty())
            }
            AnnotationValue::Number(v) => v.is_some(),
            AnnotationValue::DateTime(v) => v.is_some(),
            AnnotationValue::MultipleSelect(values) => !values.is_empty(),
        }
    }

    /// The annotation in the form the server stores it
    pub fn server_annotation(&self) -> ServerAnnotation {
        let mut server = ServerAnnotation {
            annotation_type_id: self.annotation_type_id.clone(),
            string_value: None,
            number_value: None,
            selected_values: Vec::new(),
        };

        match &self.value {
            AnnotationValue::Text(v) => {
                server.string_value = Some(v.clone().unwrap_or_default());
            }
            AnnotationValue::Number(v) => {
                server.number_value = Some(v.map(|n| n.to_string()).unwrap_or_default());
            }
            AnnotationValue::DateTime(v) => {
                server.string_value = Some(
                    v.map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                        .unwrap_or_default(),
                );
            }
            AnnotationValue::SingleSelect(v) => {
                server.selected_values = v.iter().cloned().collect();
            }
            AnnotationValue::MultipleSelect(values) => {
                server.selected_values = values.clone();
            }
        }
        server
    }

    /// [`server_annotation`](Self::server_annotation) as plain JSON
    pub fn server_value(&self) -> Value {
        serde_json::to_value(self.server_annotation()).unwrap_or(Value::Null)
    }

    /// Returns true if `obj` is a well-formed server annotation
    pub fn is_valid_server_annotation(obj: &Value) -> bool {
        schema::is_valid(obj, &ANNOTATION_SCHEMA)
    }

    /// Returns true if every object in `objs` is a well-formed server annotation
    pub fn valid_server_annotations(objs: &[Value]) -> bool {
        objs.iter().all(Self::is_valid_server_annotation)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}
