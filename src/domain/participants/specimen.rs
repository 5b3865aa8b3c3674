//! Specimen entity

use crate::adapters::api::BiobankApi;
use crate::domain::centre::location::{CentreLocationInfo, CENTRE_LOCATION_INFO_SCHEMA};
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{CollectionEventId, SpecimenId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub static SPECIMEN_SCHEMA: Schema = Schema {
    id: "Specimen",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("inventoryId", Kind::String),
        Property::new("specimenDefinitionId", Kind::String),
        Property::new("originLocationInfo", Kind::Ref(&CENTRE_LOCATION_INFO_SCHEMA)),
        Property::new("locationInfo", Kind::Ref(&CENTRE_LOCATION_INFO_SCHEMA)),
        Property::new("containerId", Kind::String).nullable(),
        Property::new("positionId", Kind::String).nullable(),
        Property::new("timeCreated", Kind::String),
        Property::new("amount", Kind::Number),
        Property::new("state", Kind::String),
    ],
    required: &[
        "id",
        "version",
        "timeAdded",
        "inventoryId",
        "specimenDefinitionId",
        "originLocationInfo",
        "locationInfo",
        "timeCreated",
        "amount",
        "state",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecimenState {
    Usable,
    Unusable,
}

/// A physical sample collected from a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    #[serde(flatten)]
    pub meta: EntityMeta<SpecimenId>,

    /// Identifier printed on the specimen's label
    pub inventory_id: String,

    pub specimen_definition_id: String,

    /// Where the specimen was collected
    pub origin_location_info: CentreLocationInfo,

    /// Where the specimen is now
    pub location_info: CentreLocationInfo,

    #[serde(default)]
    pub container_id: Option<String>,

    #[serde(default)]
    pub position_id: Option<String>,

    pub time_created: DateTime<Utc>,

    pub amount: f64,

    pub state: SpecimenState,
}

impl ConcurrencySafeEntity for Specimen {
    type Id = SpecimenId;
    const SCHEMA: &'static Schema = &SPECIMEN_SCHEMA;

    fn meta(&self) -> &EntityMeta<SpecimenId> {
        &self.meta
    }
}

impl Specimen {
    pub async fn get(api: &dyn BiobankApi, id: &SpecimenId) -> Result<Self> {
        let reply = api
            .get(&format!("/participants/cevents/spcs/get/{id}"), &Vec::new())
            .await?;
        Self::create(reply)
    }

    /// Specimens collected during one collection event
    pub async fn list(
        api: &dyn BiobankApi,
        collection_event_id: &CollectionEventId,
        options: &ListOptions,
    ) -> Result<PagedResult<Self>> {
        let reply = api
            .get(
                &format!("/participants/cevents/spcs/{collection_event_id}"),
                &options.to_query(),
            )
            .await?;
        PagedResult::from_reply(reply, "specimens", Self::create)
    }

    pub async fn remove(&self, api: &dyn BiobankApi, collection_event_id: &CollectionEventId) -> Result<()> {
        let path = format!(
            "/participants/cevents/spcs/{collection_event_id}/{}/{}",
            self.id()?,
            self.meta.version
        );
        api.delete(&path).await?;
        Ok(())
    }

    pub fn is_usable(&self) -> bool {
        self.state == SpecimenState::Usable
    }

    /// Short `centre: location` description of where the specimen is
    pub fn location_name(&self) -> Result<&str> {
        if self.location_info.name.is_empty() {
            return Err(BiobankError::domain(format!(
                "specimen has no location name: {}",
                self.inventory_id
            )));
        }
        Ok(&self.location_info.name)
    }
}
