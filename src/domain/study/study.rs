//! Study entity

use crate::adapters::api::BiobankApi;
use crate::domain::annotations::{AnnotationType, ANNOTATION_TYPE_SCHEMA};
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{AnnotationTypeId, StudyId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub static STUDY_SCHEMA: Schema = Schema {
    id: "Study",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("name", Kind::String),
        Property::new("description", Kind::String).nullable(),
        Property::new("annotationTypes", Kind::ArrayOf(&ANNOTATION_TYPE_SCHEMA)),
        Property::new("status", Kind::String),
    ],
    required: &["id", "version", "timeAdded", "name", "status"],
};

/// Lifecycle status of a study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStatus {
    Disabled,
    Enabled,
    Retired,
}

impl StudyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StudyStatus::Disabled => "Disabled",
            StudyStatus::Enabled => "Enabled",
            StudyStatus::Retired => "Retired",
        }
    }
}

impl fmt::Display for StudyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyStatus::Disabled => write!(f, "disabled"),
            StudyStatus::Enabled => write!(f, "enabled"),
            StudyStatus::Retired => write!(f, "retired"),
        }
    }
}

/// A research study that collects specimens from participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    #[serde(flatten)]
    pub meta: EntityMeta<StudyId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Participant annotation types declared by this study
    #[serde(default)]
    pub annotation_types: Vec<AnnotationType>,

    pub status: StudyStatus,
}

impl ConcurrencySafeEntity for Study {
    type Id = StudyId;
    const SCHEMA: &'static Schema = &STUDY_SCHEMA;

    fn meta(&self) -> &EntityMeta<StudyId> {
        &self.meta
    }
}

impl Study {
    /// A new, disabled study not yet added to the server
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            description,
            annotation_types: Vec::new(),
            status: StudyStatus::Disabled,
        }
    }

    pub async fn get(api: &dyn BiobankApi, id: &StudyId) -> Result<Self> {
        let reply = api.get(&format!("/studies/{id}"), &Vec::new()).await?;
        Self::create(reply)
    }

    pub async fn list(api: &dyn BiobankApi, options: &ListOptions) -> Result<PagedResult<Self>> {
        let reply = api.get("/studies", &options.to_query()).await?;
        PagedResult::from_reply(reply, "studies", Self::create)
    }

    /// Adds this study to the server and returns the persisted copy
    pub async fn add(&self, api: &dyn BiobankApi) -> Result<Self> {
        let mut body = json!({ "name": self.name });
        if let Some(description) = &self.description {
            body["description"] = json!(description);
        }
        let reply = api.post("/studies/", body).await?;
        Self::create(reply)
    }

    pub async fn update_name(&mut self, api: &dyn BiobankApi, name: &str) -> Result<()> {
        let path = format!("/studies/name/{}", self.id()?);
        self.update(api, &path, json!({ "name": name })).await
    }

    /// Sets or, with `None`, clears the description
    pub async fn update_description(
        &mut self,
        api: &dyn BiobankApi,
        description: Option<&str>,
    ) -> Result<()> {
        let path = format!("/studies/description/{}", self.id()?);
        let body = match description {
            Some(d) if !d.is_empty() => json!({ "description": d }),
            _ => json!({}),
        };
        self.update(api, &path, body).await
    }

    pub async fn add_annotation_type(
        &mut self,
        api: &dyn BiobankApi,
        annotation_type: &AnnotationType,
    ) -> Result<()> {
        let path = format!("/studies/pannottype/{}", self.id()?);
        self.update(api, &path, annotation_type_body(annotation_type)?).await
    }

    pub async fn update_annotation_type(
        &mut self,
        api: &dyn BiobankApi,
        annotation_type: &AnnotationType,
    ) -> Result<()> {
        let path = format!(
            "/studies/pannottype/{}/{}",
            self.id()?,
            annotation_type.unique_id()?
        );
        self.update(api, &path, annotation_type_body(annotation_type)?).await
    }

    /// Removes an annotation type from the server and then locally
    ///
    /// # Errors
    ///
    /// Fails before any request if this study does not declare the type.
    pub async fn remove_annotation_type(
        &mut self,
        api: &dyn BiobankApi,
        unique_id: &AnnotationTypeId,
    ) -> Result<()> {
        if !self
            .annotation_types
            .iter()
            .any(|at| at.unique_id.as_ref() == Some(unique_id))
        {
            return Err(BiobankError::domain(format!(
                "annotation type with ID not present: {unique_id}"
            )));
        }

        let path = format!(
            "/studies/pannottype/{}/{}/{unique_id}",
            self.id()?,
            self.meta.version
        );
        api.delete(&path).await?;

        self.annotation_types
            .retain(|at| at.unique_id.as_ref() != Some(unique_id));
        self.meta.version += 1;
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.status == StudyStatus::Disabled
    }

    pub fn is_enabled(&self) -> bool {
        self.status == StudyStatus::Enabled
    }

    pub fn is_retired(&self) -> bool {
        self.status == StudyStatus::Retired
    }

    pub async fn disable(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if self.is_disabled() {
            return Err(BiobankError::domain("already disabled"));
        }
        self.change_status(api, "disable").await
    }

    pub async fn enable(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if self.is_enabled() {
            return Err(BiobankError::domain("already enabled"));
        }
        self.change_status(api, "enable").await
    }

    pub async fn retire(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if self.is_retired() {
            return Err(BiobankError::domain("already retired"));
        }
        self.change_status(api, "retire").await
    }

    pub async fn unretire(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if !self.is_retired() {
            return Err(BiobankError::domain("not retired"));
        }
        self.change_status(api, "unretire").await
    }

    async fn change_status(&mut self, api: &dyn BiobankApi, action: &str) -> Result<()> {
        let id = self.id()?.clone();
        let path = format!("/studies/{action}/{id}");
        let from = self.status;
        self.update(api, &path, Value::Null).await?;
        crate::log_state_transition!("Study", id, from, self.status);
        Ok(())
    }
}

/// Annotation type as sent to the server, without its `uniqueId`
pub(crate) fn annotation_type_body(annotation_type: &AnnotationType) -> Result<Value> {
    let mut body = serde_json::to_value(annotation_type)?;
    if let Some(map) = body.as_object_mut() {
        map.remove("uniqueId");
    }
    Ok(body)
}
