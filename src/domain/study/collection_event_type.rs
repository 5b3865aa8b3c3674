//! Collection event type: a kind of visit declared by a study

use crate::adapters::api::BiobankApi;
use crate::domain::annotations::{AnnotationType, ANNOTATION_TYPE_SCHEMA};
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::ids::{CollectionEventTypeId, StudyId};
use crate::domain::paged::list_from_reply;
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use serde::{Deserialize, Serialize};

pub static COLLECTION_EVENT_TYPE_SCHEMA: Schema = Schema {
    id: "CollectionEventType",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("studyId", Kind::String),
        Property::new("name", Kind::String),
        Property::new("description", Kind::String).nullable(),
        Property::new("recurring", Kind::Boolean),
        Property::new("annotationTypes", Kind::ArrayOf(&ANNOTATION_TYPE_SCHEMA)),
    ],
    required: &["id", "version", "timeAdded", "studyId", "name", "recurring"],
};

/// A kind of collection event, with the annotation types its events carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEventType {
    #[serde(flatten)]
    pub meta: EntityMeta<CollectionEventTypeId>,

    pub study_id: StudyId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Whether a participant may have more than one event of this type
    pub recurring: bool,

    #[serde(default)]
    pub annotation_types: Vec<AnnotationType>,
}

impl ConcurrencySafeEntity for CollectionEventType {
    type Id = CollectionEventTypeId;
    const SCHEMA: &'static Schema = &COLLECTION_EVENT_TYPE_SCHEMA;

    fn meta(&self) -> &EntityMeta<CollectionEventTypeId> {
        &self.meta
    }
}

impl CollectionEventType {
    pub async fn get(
        api: &dyn BiobankApi,
        study_id: &StudyId,
        id: &CollectionEventTypeId,
    ) -> Result<Self> {
        let reply = api
            .get(&format!("/studies/cetypes/{study_id}/{id}"), &Vec::new())
            .await?;
        Self::create(reply)
    }

    /// All collection event types of a study
    pub async fn list(api: &dyn BiobankApi, study_id: &StudyId) -> Result<Vec<Self>> {
        let reply = api
            .get(&format!("/studies/cetypes/{study_id}"), &Vec::new())
            .await?;
        list_from_reply(reply, "collection event types", Self::create)
    }
}
