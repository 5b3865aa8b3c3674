//! A specimen's membership in a shipment

use super::shipment_state::ShipmentItemState;
use crate::adapters::api::BiobankApi;
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::ids::{ShipmentContainerId, ShipmentId, ShipmentSpecimenId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::participants::specimen::{Specimen, SPECIMEN_SCHEMA};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use serde::{Deserialize, Serialize};

pub static SHIPMENT_SPECIMEN_SCHEMA: Schema = Schema {
    id: "ShipmentSpecimen",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("state", Kind::String),
        Property::new("shipmentId", Kind::String),
        Property::new("shipmentContainerId", Kind::String).nullable(),
        Property::new("specimen", Kind::Ref(&SPECIMEN_SCHEMA)),
    ],
    required: &["version", "state", "shipmentId", "specimen"],
};

/// A specimen travelling in a shipment, with its per-shipment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSpecimen {
    #[serde(flatten)]
    pub meta: EntityMeta<ShipmentSpecimenId>,

    pub state: ShipmentItemState,

    pub shipment_id: ShipmentId,

    #[serde(default)]
    pub shipment_container_id: Option<ShipmentContainerId>,

    pub specimen: Specimen,
}

impl ConcurrencySafeEntity for ShipmentSpecimen {
    type Id = ShipmentSpecimenId;
    const SCHEMA: &'static Schema = &SHIPMENT_SPECIMEN_SCHEMA;

    fn meta(&self) -> &EntityMeta<ShipmentSpecimenId> {
        &self.meta
    }
}

impl ShipmentSpecimen {
    pub async fn get(api: &dyn BiobankApi, id: &ShipmentSpecimenId) -> Result<Self> {
        let reply = api
            .get(&format!("/shipments/specimens/{id}"), &Vec::new())
            .await?;
        Self::create(reply)
    }

    /// Specimens contained in a shipment
    pub async fn list(
        api: &dyn BiobankApi,
        shipment_id: &ShipmentId,
        options: &ListOptions,
    ) -> Result<PagedResult<Self>> {
        let reply = api
            .get(&format!("/shipments/specimens/{shipment_id}"), &options.to_query())
            .await?;
        PagedResult::from_reply(reply, "shipment specimens", Self::create)
    }

    pub fn inventory_id(&self) -> &str {
        &self.specimen.inventory_id
    }
}
