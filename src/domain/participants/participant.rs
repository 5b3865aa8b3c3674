//! Participant entity

use crate::adapters::api::BiobankApi;
use crate::domain::annotations::{AnnotatedEntity, Annotation, AnnotationEntry, ANNOTATION_SCHEMA};
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{AnnotationTypeId, ParticipantId, StudyId};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use crate::domain::study::Study;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub static PARTICIPANT_SCHEMA: Schema = Schema {
    id: "Participant",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("studyId", Kind::String),
        Property::new("uniqueId", Kind::String),
        Property::new("annotations", Kind::ArrayOf(&ANNOTATION_SCHEMA)),
    ],
    required: &["id", "version", "timeAdded", "studyId", "uniqueId", "annotations"],
};

/// A person enrolled in a study, annotated per the study's annotation types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(flatten)]
    pub meta: EntityMeta<ParticipantId>,

    pub study_id: StudyId,

    /// Study-assigned identifier, unique within the study
    pub unique_id: String,

    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,

    #[serde(skip)]
    study: Option<Study>,
}

impl ConcurrencySafeEntity for Participant {
    type Id = ParticipantId;
    const SCHEMA: &'static Schema = &PARTICIPANT_SCHEMA;

    fn meta(&self) -> &EntityMeta<ParticipantId> {
        &self.meta
    }

    fn carry_over(&self, updated: &mut Self) -> Result<()> {
        if let Some(study) = &self.study {
            updated.set_study(study)?;
        }
        Ok(())
    }
}

impl AnnotatedEntity for Participant {
    fn annotations(&self) -> &[AnnotationEntry] {
        &self.annotations
    }

    fn annotations_mut(&mut self) -> &mut Vec<AnnotationEntry> {
        &mut self.annotations
    }

    fn meta_mut(&mut self) -> &mut EntityMeta<ParticipantId> {
        &mut self.meta
    }
}

impl Participant {
    pub fn new(study: &Study, unique_id: impl Into<String>) -> Result<Self> {
        let mut participant = Self {
            meta: EntityMeta::new(),
            study_id: study.id()?.clone(),
            unique_id: unique_id.into(),
            annotations: Vec::new(),
            study: None,
        };
        participant.set_study(study)?;
        Ok(participant)
    }

    pub async fn get(api: &dyn BiobankApi, id: &ParticipantId) -> Result<Self> {
        let reply = api.get(&format!("/participants/{id}"), &Vec::new()).await?;
        Self::create(reply)
    }

    pub async fn get_by_unique_id(
        api: &dyn BiobankApi,
        study_id: &StudyId,
        unique_id: &str,
    ) -> Result<Self> {
        let reply = api
            .get(&format!("/participants/uniqueId/{study_id}/{unique_id}"), &Vec::new())
            .await?;
        Self::create(reply)
    }

    pub fn study(&self) -> Option<&Study> {
        self.study.as_ref()
    }

    /// Binds this participant to its study and types its annotations
    ///
    /// # Errors
    ///
    /// Fails if `study` is not the participant's study.
    pub fn set_study(&mut self, study: &Study) -> Result<()> {
        if study.meta.id.as_ref() != Some(&self.study_id) {
            return Err(BiobankError::domain(format!(
                "participant does not belong to study: {}",
                study.name
            )));
        }
        self.set_annotation_types(&study.annotation_types)?;
        self.study = Some(study.clone());
        Ok(())
    }

    pub async fn add(&self, api: &dyn BiobankApi) -> Result<Self> {
        let annotations = self
            .annotations
            .iter()
            .map(|entry| serde_json::to_value(entry.server_annotation()))
            .collect::<serde_json::Result<Vec<Value>>>()?;
        let body = json!({
            "studyId": self.study_id,
            "uniqueId": self.unique_id,
            "annotations": annotations,
        });
        let reply = api
            .post(&format!("/participants/{}", self.study_id), body)
            .await?;
        let mut added = Self::create(reply)?;
        self.carry_over(&mut added)?;
        Ok(added)
    }

    pub async fn update_unique_id(&mut self, api: &dyn BiobankApi, unique_id: &str) -> Result<()> {
        let path = format!("/participants/uniqueId/{}", self.id()?);
        self.update(api, &path, json!({ "uniqueId": unique_id }))
            .await
    }

    pub async fn add_annotation(&mut self, api: &dyn BiobankApi, annotation: &Annotation) -> Result<()> {
        let path = format!("/participants/annot/{}", self.id()?);
        self.add_annotation_at(api, annotation, &path).await
    }

    pub async fn remove_annotation(
        &mut self,
        api: &dyn BiobankApi,
        annotation_type_id: &AnnotationTypeId,
    ) -> Result<()> {
        let path = format!(
            "/participants/annot/{}/{}/{annotation_type_id}",
            self.id()?,
            self.meta.version
        );
        self.remove_annotation_at(api, annotation_type_id, &path)
            .await
    }
}
