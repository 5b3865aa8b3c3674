//! Shared behaviour of entities that carry annotations

use super::annotation::{Annotation, ServerAnnotation};
use super::annotation_type::AnnotationType;
use crate::adapters::api::BiobankApi;
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::AnnotationTypeId;
use crate::domain::result::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One element of an entity's `annotations` collection
///
/// Entities decoded from the server hold [`Raw`](Self::Raw) entries until
/// they are bound to their annotation types, which turns every entry into a
/// [`Typed`](Self::Typed) one. Both serialize to the server form.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEntry {
    Raw(ServerAnnotation),
    Typed(Annotation),
}

impl AnnotationEntry {
    pub fn annotation_type_id(&self) -> &AnnotationTypeId {
        match self {
            AnnotationEntry::Raw(raw) => &raw.annotation_type_id,
            AnnotationEntry::Typed(annotation) => annotation.annotation_type_id(),
        }
    }

    pub fn as_typed(&self) -> Option<&Annotation> {
        match self {
            AnnotationEntry::Typed(annotation) => Some(annotation),
            AnnotationEntry::Raw(_) => None,
        }
    }

    pub fn server_annotation(&self) -> ServerAnnotation {
        match self {
            AnnotationEntry::Raw(raw) => raw.clone(),
            AnnotationEntry::Typed(annotation) => annotation.server_annotation(),
        }
    }
}

impl Serialize for AnnotationEntry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AnnotationEntry::Raw(raw) => raw.serialize(serializer),
            AnnotationEntry::Typed(annotation) => annotation.server_annotation().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AnnotationEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ServerAnnotation::deserialize(deserializer).map(AnnotationEntry::Raw)
    }
}

impl From<Annotation> for AnnotationEntry {
    fn from(annotation: Annotation) -> Self {
        AnnotationEntry::Typed(annotation)
    }
}

/// Rebuilds `annotations` so it holds one typed annotation per type, in
/// the order of `annotation_types`
///
/// Entries already typed are kept as they are; raw entries are converted;
/// types with no entry get an empty annotation.
///
/// # Errors
///
/// Fails with "annotation types not found" if an existing entry references
/// a type absent from `annotation_types`. `annotations` is unchanged on error.
pub fn bind_annotation_types(
    annotations: &mut Vec<AnnotationEntry>,
    annotation_types: &[AnnotationType],
) -> Result<()> {
    let mut known = Vec::with_capacity(annotation_types.len());
    for annotation_type in annotation_types {
        known.push(annotation_type.unique_id()?);
    }

    let missing: Vec<&str> = annotations
        .iter()
        .map(AnnotationEntry::annotation_type_id)
        .filter(|id| !known.contains(id))
        .map(AnnotationTypeId::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(BiobankError::domain(format!(
            "annotation types not found: {}",
            missing.join(",")
        )));
    }

    let mut bound = Vec::with_capacity(annotation_types.len());
    for (annotation_type, id) in annotation_types.iter().zip(&known) {
        let existing = annotations.iter().find(|entry| entry.annotation_type_id() == *id);
        let annotation = match existing {
            Some(AnnotationEntry::Typed(annotation)) => annotation.clone(),
            Some(AnnotationEntry::Raw(raw)) => Annotation::create(Some(raw), annotation_type)?,
            None => Annotation::create(None, annotation_type)?,
        };
        bound.push(AnnotationEntry::Typed(annotation));
    }

    *annotations = bound;
    Ok(())
}

/// Capability shared by entities with an `annotations` collection
#[async_trait]
pub trait AnnotatedEntity: ConcurrencySafeEntity {
    fn annotations(&self) -> &[AnnotationEntry];

    fn annotations_mut(&mut self) -> &mut Vec<AnnotationEntry>;

    fn meta_mut(&mut self) -> &mut EntityMeta<Self::Id>;

    /// Re-synchronises the annotations against `annotation_types`
    ///
    /// See [`bind_annotation_types`].
    fn set_annotation_types(&mut self, annotation_types: &[AnnotationType]) -> Result<()> {
        bind_annotation_types(self.annotations_mut(), annotation_types)
    }

    /// Annotations that have been bound to their types
    fn typed_annotations(&self) -> Vec<&Annotation> {
        self.annotations()
            .iter()
            .filter_map(AnnotationEntry::as_typed)
            .collect()
    }

    /// Returns true if no bound annotation is missing a required value
    fn valid_annotations(&self) -> bool {
        self.typed_annotations()
            .iter()
            .all(|annotation| annotation.is_value_valid())
    }

    fn find_annotation(&self, annotation_type_id: &AnnotationTypeId) -> Option<&AnnotationEntry> {
        self.annotations()
            .iter()
            .find(|entry| entry.annotation_type_id() == annotation_type_id)
    }

    /// Stores `annotation` on the server through an entity update at `path`
    async fn add_annotation_at(
        &mut self,
        api: &dyn BiobankApi,
        annotation: &Annotation,
        path: &str,
    ) -> Result<()> {
        self.update(api, path, annotation.server_value()).await
    }

    /// Deletes an annotation on the server, then drops it locally
    ///
    /// The server answers a removal with no entity, so the local copy takes
    /// the version the server moved to.
    ///
    /// # Errors
    ///
    /// Fails before any request if this entity has no annotation for
    /// `annotation_type_id`. Server failures propagate and leave the entity
    /// unchanged.
    async fn remove_annotation_at(
        &mut self,
        api: &dyn BiobankApi,
        annotation_type_id: &AnnotationTypeId,
        path: &str,
    ) -> Result<()> {
        if self.find_annotation(annotation_type_id).is_none() {
            return Err(BiobankError::domain(format!(
                "annotation with annotation type ID not present: {annotation_type_id}"
            )));
        }

        api.delete(path).await?;

        self.annotations_mut()
            .retain(|entry| entry.annotation_type_id() != annotation_type_id);
        self.meta_mut().version += 1;
        Ok(())
    }
}
