//! Custom fields: annotation types and annotation values
//!
//! An [`AnnotationType`] describes a field; an [`Annotation`] holds one
//! value for it. Entities carrying annotations implement
//! [`AnnotatedEntity`].

pub mod annotation;
pub mod annotation_type;
pub mod has_annotations;

pub use annotation::{Annotation, AnnotationValue, ServerAnnotation, ANNOTATION_SCHEMA};
pub use annotation_type::{
    AnnotationType, AnnotationValueType, ANNOTATION_TYPE_SCHEMA, MAX_VALUE_COUNT_NONE,
    MAX_VALUE_COUNT_SINGLE,
};
pub use has_annotations::{bind_annotation_types, AnnotatedEntity, AnnotationEntry};
