//! Centre entity

use super::location::{Location, LOCATION_SCHEMA};
use crate::adapters::api::BiobankApi;
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{CentreId, LocationId, StudyId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub static CENTRE_SCHEMA: Schema = Schema {
    id: "Centre",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("name", Kind::String),
        Property::new("description", Kind::String).nullable(),
        Property::new("studyIds", Kind::Array),
        Property::new("locations", Kind::ArrayOf(&LOCATION_SCHEMA)),
        Property::new("state", Kind::String),
    ],
    required: &["id", "version", "timeAdded", "name", "state"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentreState {
    Disabled,
    Enabled,
}

impl fmt::Display for CentreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentreState::Disabled => write!(f, "disabled"),
            CentreState::Enabled => write!(f, "enabled"),
        }
    }
}

/// A site where specimens are collected, stored or shipped from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centre {
    #[serde(flatten)]
    pub meta: EntityMeta<CentreId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Studies this centre participates in
    #[serde(default)]
    pub study_ids: Vec<StudyId>,

    #[serde(default)]
    pub locations: Vec<Location>,

    pub state: CentreState,
}

impl ConcurrencySafeEntity for Centre {
    type Id = CentreId;
    const SCHEMA: &'static Schema = &CENTRE_SCHEMA;

    fn meta(&self) -> &EntityMeta<CentreId> {
        &self.meta
    }
}

impl Centre {
    /// A new, disabled centre not yet added to the server
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            description,
            study_ids: Vec::new(),
            locations: Vec::new(),
            state: CentreState::Disabled,
        }
    }

    pub async fn get(api: &dyn BiobankApi, id: &CentreId) -> Result<Self> {
        let reply = api.get(&format!("/centres/{id}"), &Vec::new()).await?;
        Self::create(reply)
    }

    pub async fn list(api: &dyn BiobankApi, options: &ListOptions) -> Result<PagedResult<Self>> {
        let reply = api.get("/centres", &options.to_query()).await?;
        PagedResult::from_reply(reply, "centres", Self::create)
    }

    pub async fn add(&self, api: &dyn BiobankApi) -> Result<Self> {
        let mut body = json!({ "name": self.name });
        if let Some(description) = &self.description {
            body["description"] = json!(description);
        }
        let reply = api.post("/centres/", body).await?;
        Self::create(reply)
    }

    pub async fn update_name(&mut self, api: &dyn BiobankApi, name: &str) -> Result<()> {
        let path = format!("/centres/name/{}", self.id()?);
        self.update(api, &path, json!({ "name": name })).await
    }

    pub async fn update_description(
        &mut self,
        api: &dyn BiobankApi,
        description: Option<&str>,
    ) -> Result<()> {
        let path = format!("/centres/description/{}", self.id()?);
        let body = match description {
            Some(d) if !d.is_empty() => json!({ "description": d }),
            _ => json!({}),
        };
        self.update(api, &path, body).await
    }

    pub fn is_disabled(&self) -> bool {
        self.state == CentreState::Disabled
    }

    pub fn is_enabled(&self) -> bool {
        self.state == CentreState::Enabled
    }

    pub async fn disable(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if self.is_disabled() {
            return Err(BiobankError::domain("already disabled"));
        }
        self.change_state(api, "disable").await
    }

    pub async fn enable(&mut self, api: &dyn BiobankApi) -> Result<()> {
        if self.is_enabled() {
            return Err(BiobankError::domain("already enabled"));
        }
        self.change_state(api, "enable").await
    }

    pub async fn add_location(&mut self, api: &dyn BiobankApi, location: &Location) -> Result<()> {
        let path = format!("/centres/locations/{}", self.id()?);
        let mut body = serde_json::to_value(location)?;
        if let Some(map) = body.as_object_mut() {
            map.remove("id");
        }
        self.update(api, &path, body).await
    }

    /// Removes a location on the server and then locally
    ///
    /// # Errors
    ///
    /// Fails before any request if the centre has no such location.
    pub async fn remove_location(&mut self, api: &dyn BiobankApi, location_id: &LocationId) -> Result<()> {
        if !self.locations.iter().any(|l| l.id.as_ref() == Some(location_id)) {
            return Err(BiobankError::domain(format!(
                "location with ID not present: {location_id}"
            )));
        }
        let path = format!(
            "/centres/locations/{}/{}/{location_id}",
            self.id()?,
            self.meta.version
        );
        api.delete(&path).await?;
        self.locations.retain(|l| l.id.as_ref() != Some(location_id));
        self.meta.version += 1;
        Ok(())
    }

    pub async fn add_study(&mut self, api: &dyn BiobankApi, study_id: &StudyId) -> Result<()> {
        let path = format!("/centres/studies/{}", self.id()?);
        self.update(api, &path, json!({ "studyId": study_id })).await
    }

    pub async fn remove_study(&mut self, api: &dyn BiobankApi, study_id: &StudyId) -> Result<()> {
        if !self.study_ids.contains(study_id) {
            return Err(BiobankError::domain(format!(
                "study ID not present: {study_id}"
            )));
        }
        let path = format!(
            "/centres/studies/{}/{}/{study_id}",
            self.id()?,
            self.meta.version
        );
        api.delete(&path).await?;
        self.study_ids.retain(|id| id != study_id);
        self.meta.version += 1;
        Ok(())
    }

    async fn change_state(&mut self, api: &dyn BiobankApi, action: &str) -> Result<()> {
        let id = self.id()?.clone();
        let from = self.state;
        self.update(api, &format!("/centres/{action}/{id}"), Value::Null)
            .await?;
        crate::log_state_transition!("Centre", id, from, self.state);
        Ok(())
    }
}
