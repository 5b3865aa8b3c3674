//! Collection event entity: one visit of a participant

use crate::adapters::api::BiobankApi;
use crate::domain::annotations::{
    AnnotatedEntity, Annotation, AnnotationEntry, ANNOTATION_SCHEMA,
};
use crate::domain::entity::{timestamp, ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{AnnotationTypeId, CollectionEventId, CollectionEventTypeId, ParticipantId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use crate::domain::study::CollectionEventType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub static COLLECTION_EVENT_SCHEMA: Schema = Schema {
    id: "CollectionEvent",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("participantId", Kind::String),
        Property::new("collectionEventTypeId", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("timeCompleted", Kind::String),
        Property::new("visitNumber", Kind::Integer),
        Property::new("annotations", Kind::ArrayOf(&ANNOTATION_SCHEMA)),
    ],
    required: &[
        "id",
        "participantId",
        "collectionEventTypeId",
        "timeCompleted",
        "visitNumber",
        "annotations",
        "version",
    ],
};

/// A recorded visit, annotated per its collection event type
///
/// When bound to its [`CollectionEventType`] the annotations are typed; the
/// binding survives every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEvent {
    #[serde(flatten)]
    pub meta: EntityMeta<CollectionEventId>,

    pub participant_id: ParticipantId,

    pub collection_event_type_id: CollectionEventTypeId,

    pub time_completed: DateTime<Utc>,

    pub visit_number: u32,

    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,

    #[serde(skip)]
    collection_event_type: Option<CollectionEventType>,
}

impl ConcurrencySafeEntity for CollectionEvent {
    type Id = CollectionEventId;
    const SCHEMA: &'static Schema = &COLLECTION_EVENT_SCHEMA;

    fn meta(&self) -> &EntityMeta<CollectionEventId> {
        &self.meta
    }

    fn carry_over(&self, updated: &mut Self) -> Result<()> {
        if let Some(collection_event_type) = &self.collection_event_type {
            updated.set_collection_event_type(collection_event_type)?;
        }
        Ok(())
    }
}

impl AnnotatedEntity for CollectionEvent {
    fn annotations(&self) -> &[AnnotationEntry] {
        &self.annotations
    }

    fn annotations_mut(&mut self) -> &mut Vec<AnnotationEntry> {
        &mut self.annotations
    }

    fn meta_mut(&mut self) -> &mut EntityMeta<CollectionEventId> {
        &mut self.meta
    }
}

impl CollectionEvent {
    /// A new event for `participant_id`, annotated per `collection_event_type`
    pub fn new(
        participant_id: ParticipantId,
        collection_event_type: &CollectionEventType,
        visit_number: u32,
        time_completed: DateTime<Utc>,
    ) -> Result<Self> {
        let mut event = Self {
            meta: EntityMeta::new(),
            participant_id,
            collection_event_type_id: collection_event_type.id()?.clone(),
            time_completed,
            visit_number,
            annotations: Vec::new(),
            collection_event_type: None,
        };
        event.set_collection_event_type(collection_event_type)?;
        Ok(event)
    }

    /// Validates a server object and optionally binds it to its type
    ///
    /// # Errors
    ///
    /// Besides schema failures, fails with "invalid collection event type"
    /// if `collection_event_type` is not the event's type.
    pub fn create_with_type(
        obj: Value,
        collection_event_type: Option<&CollectionEventType>,
    ) -> Result<Self> {
        let mut event = Self::create(obj)?;
        if let Some(collection_event_type) = collection_event_type {
            if collection_event_type.meta.id.as_ref() != Some(&event.collection_event_type_id) {
                return Err(BiobankError::domain("invalid collection event type"));
            }
            event.set_collection_event_type(collection_event_type)?;
        }
        Ok(event)
    }

    pub async fn get(api: &dyn BiobankApi, id: &CollectionEventId) -> Result<Self> {
        let reply = api
            .get(&format!("/participants/cevents/{id}"), &Vec::new())
            .await?;
        Self::create(reply)
    }

    pub async fn list(
        api: &dyn BiobankApi,
        participant_id: &ParticipantId,
        options: &ListOptions,
    ) -> Result<PagedResult<Self>> {
        let reply = api
            .get(
                &format!("/participants/cevents/list/{participant_id}"),
                &options.to_query(),
            )
            .await?;
        PagedResult::from_reply(reply, "collection events", Self::create)
    }

    pub async fn get_by_visit_number(
        api: &dyn BiobankApi,
        participant_id: &ParticipantId,
        visit_number: u32,
        collection_event_type: Option<&CollectionEventType>,
    ) -> Result<Self> {
        let reply = api
            .get(
                &format!("/participants/cevents/{participant_id}/visitNumber/{visit_number}"),
                &Vec::new(),
            )
            .await?;
        Self::create_with_type(reply, collection_event_type)
    }

    pub fn collection_event_type(&self) -> Option<&CollectionEventType> {
        self.collection_event_type.as_ref()
    }

    /// Binds this event to its type and types its annotations
    pub fn set_collection_event_type(&mut self, collection_event_type: &CollectionEventType) -> Result<()> {
        let id = collection_event_type.id()?.clone();
        self.set_annotation_types(&collection_event_type.annotation_types)?;
        self.collection_event_type_id = id;
        self.collection_event_type = Some(collection_event_type.clone());
        Ok(())
    }

    /// Adds this event to the server and returns the persisted copy
    ///
    /// # Errors
    ///
    /// Fails before any request if a required annotation has no value.
    pub async fn add(&self, api: &dyn BiobankApi) -> Result<Self> {
        let mut annotations = Vec::with_capacity(self.annotations.len());
        for entry in &self.annotations {
            if let AnnotationEntry::Typed(annotation) = entry {
                if !annotation.is_value_valid() {
                    return Err(BiobankError::domain(format!(
                        "required annotation has no value: annotationTypeId: {}",
                        annotation.annotation_type_id()
                    )));
                }
            }
            annotations.push(serde_json::to_value(entry.server_annotation())?);
        }

        let body = json!({
            "participantId": self.participant_id,
            "collectionEventTypeId": self.collection_event_type_id,
            "timeCompleted": timestamp(&self.time_completed),
            "visitNumber": self.visit_number,
            "annotations": annotations,
        });
        let reply = api
            .post(&format!("/participants/cevents/{}", self.participant_id), body)
            .await?;
        Self::create_with_type(reply, self.collection_event_type.as_ref())
    }

    pub async fn remove(&self, api: &dyn BiobankApi) -> Result<()> {
        let path = format!(
            "/participants/cevents/{}/{}/{}",
            self.participant_id,
            self.id()?,
            self.meta.version
        );
        api.delete(&path).await?;
        Ok(())
    }

    pub async fn update_visit_number(&mut self, api: &dyn BiobankApi, visit_number: u32) -> Result<()> {
        let path = format!("/participants/cevents/visitNumber/{}", self.id()?);
        self.update(api, &path, json!({ "visitNumber": visit_number }))
            .await
    }

    pub async fn update_time_completed(
        &mut self,
        api: &dyn BiobankApi,
        time_completed: DateTime<Utc>,
    ) -> Result<()> {
        let path = format!("/participants/cevents/timeCompleted/{}", self.id()?);
        self.update(api, &path, json!({ "timeCompleted": timestamp(&time_completed) }))
            .await
    }

    pub async fn add_annotation(&mut self, api: &dyn BiobankApi, annotation: &Annotation) -> Result<()> {
        let path = format!("/participants/cevents/annot/{}", self.id()?);
        self.add_annotation_at(api, annotation, &path).await
    }

    pub async fn remove_annotation(
        &mut self,
        api: &dyn BiobankApi,
        annotation_type_id: &AnnotationTypeId,
    ) -> Result<()> {
        let path = format!(
            "/participants/cevents/annot/{}/{}/{annotation_type_id}",
            self.id()?,
            self.meta.version
        );
        self.remove_annotation_at(api, annotation_type_id, &path)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotations::AnnotationValue;

    fn cet() -> CollectionEventType {
        CollectionEventType::create(json!({
            "id": "cet1",
            "version": 0,
            "timeAdded": "2024-01-01T00:00:00Z",
            "studyId": "st1",
            "name": "Baseline",
            "recurring": false,
            "annotationTypes": [
                { "uniqueId": "at1", "name": "Weight", "valueType": "Number", "required": true },
                { "uniqueId": "at2", "name": "Notes", "valueType": "Text", "required": false }
            ]
        }))
        .unwrap()
    }

    fn event_json() -> Value {
        json!({
            "id": "ce1",
            "participantId": "p1",
            "collectionEventTypeId": "cet1",
            "version": 1,
            "timeAdded": "2024-01-01T00:00:00Z",
            "timeCompleted": "2024-01-02T00:00:00Z",
            "visitNumber": 1,
            "annotations": [
                { "annotationTypeId": "at1", "numberValue": "70", "selectedValues": [] }
            ]
        })
    }

    #[test]
    fn test_create_without_type_keeps_raw_annotations() {
        let event = CollectionEvent::create(event_json()).unwrap();
        assert!(matches!(event.annotations[0], AnnotationEntry::Raw(_)));
        assert!(event.collection_event_type().is_none());
    }

    #[test]
    fn test_create_with_type_binds_annotations() {
        let event = CollectionEvent::create_with_type(event_json(), Some(&cet())).unwrap();
        assert_eq!(event.annotations.len(), 2);
        let typed = event.typed_annotations();
        assert_eq!(typed[0].value(), &AnnotationValue::Number(Some(70.0)));
        assert!(event.valid_annotations());
    }

    #[test]
    fn test_create_with_wrong_type() {
        let mut obj = event_json();
        obj["collectionEventTypeId"] = json!("other");
        let err = CollectionEvent::create_with_type(obj, Some(&cet())).unwrap_err();
        assert_eq!(err.to_string(), "invalid collection event type");
    }

    #[test]
    fn test_create_rejects_bad_annotation() {
        let mut obj = event_json();
        obj["annotations"] = json!([{ "stringValue": "x" }]);
        let err = CollectionEvent::create(obj).unwrap_err();
        assert!(err.to_string().contains("annotations[0]"));
    }

    #[test]
    fn test_create_rejects_fractional_visit_number() {
        let mut obj = event_json();
        obj["visitNumber"] = json!(1.5);
        assert!(CollectionEvent::create(obj).is_err());
    }

    #[test]
    fn test_new_event_has_empty_typed_annotations() {
        let event = CollectionEvent::new(
            ParticipantId::new("p1").unwrap(),
            &cet(),
            1,
            "2024-01-02T00:00:00Z".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(event.typed_annotations().len(), 2);
        assert!(!event.valid_annotations());
    }
}
