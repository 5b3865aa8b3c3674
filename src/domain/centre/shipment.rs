//! Shipment entity and its transfer workflow
//!
//! A shipment moves specimens from one centre location to another. Every
//! state change goes through [`Shipment::transition`], which checks the
//! transition table locally, posts to `/shipments/state/...` and adopts the
//! server's reply.
//!
//! # Example
//!
//! ```no_run
//! use biobank::adapters::api::HttpApi;
//! use biobank::config::ApiConfig;
//! use biobank::domain::centre::Shipment;
//! use biobank::domain::ids::ShipmentId;
//! use chrono::Utc;
//!
//! # async fn example() -> biobank::domain::Result<()> {
//! let api = HttpApi::new(&ApiConfig::default())?;
//! let mut shipment = Shipment::get(&api, &ShipmentId::new("s1").unwrap()).await?;
//! shipment.pack(&api, Utc::now()).await?;
//! shipment.send(&api, Utc::now()).await?;
//! assert!(shipment.is_sent());
//! # Ok(())
//! # }
//! ```

use super::location::{CentreLocationInfo, CENTRE_LOCATION_INFO_SCHEMA};
use super::shipment_specimen::ShipmentSpecimen;
use super::shipment_state::{ShipmentItemState, ShipmentState, ShipmentTransition};
use crate::adapters::api::BiobankApi;
use crate::domain::entity::{timestamp, ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::{CentreId, LocationId, ShipmentContainerId, ShipmentId};
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::participants::Specimen;
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub static SHIPMENT_SCHEMA: Schema = Schema {
    id: "Shipment",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("state", Kind::String),
        Property::new("courierName", Kind::String),
        Property::new("trackingNumber", Kind::String),
        Property::new("fromLocationInfo", Kind::Ref(&CENTRE_LOCATION_INFO_SCHEMA)),
        Property::new("toLocationInfo", Kind::Ref(&CENTRE_LOCATION_INFO_SCHEMA)),
        Property::new("timePacked", Kind::String).nullable(),
        Property::new("timeSent", Kind::String).nullable(),
        Property::new("timeReceived", Kind::String).nullable(),
        Property::new("timeUnpacked", Kind::String).nullable(),
    ],
    required: &[
        "id",
        "version",
        "state",
        "courierName",
        "trackingNumber",
        "fromLocationInfo",
        "toLocationInfo",
    ],
};

/// A tracked transfer of specimens between two centre locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(flatten)]
    pub meta: EntityMeta<ShipmentId>,

    pub state: ShipmentState,

    pub courier_name: String,

    pub tracking_number: String,

    pub from_location_info: CentreLocationInfo,

    pub to_location_info: CentreLocationInfo,

    #[serde(default)]
    pub time_packed: Option<DateTime<Utc>>,

    #[serde(default)]
    pub time_sent: Option<DateTime<Utc>>,

    #[serde(default)]
    pub time_received: Option<DateTime<Utc>>,

    #[serde(default)]
    pub time_unpacked: Option<DateTime<Utc>>,
}

impl ConcurrencySafeEntity for Shipment {
    type Id = ShipmentId;
    const SCHEMA: &'static Schema = &SHIPMENT_SCHEMA;

    fn meta(&self) -> &EntityMeta<ShipmentId> {
        &self.meta
    }
}

impl Shipment {
    /// Creates a new builder for a shipment that has not been added yet
    pub fn builder() -> ShipmentBuilder {
        ShipmentBuilder::default()
    }

    pub async fn get(api: &dyn BiobankApi, id: &ShipmentId) -> Result<Self> {
        let reply = api.get(&format!("/shipments/{id}"), &Vec::new()).await?;
        Self::create(reply)
    }

    /// Shipments coming from or going to a centre
    pub async fn list(
        api: &dyn BiobankApi,
        centre_id: &CentreId,
        options: &ListOptions,
    ) -> Result<PagedResult<Self>> {
        let reply = api
            .get(&format!("/shipments/list/{centre_id}"), &options.to_query())
            .await?;
        PagedResult::from_reply(reply, "shipments", Self::create)
    }

    /// Adds this shipment to the server and returns the persisted copy
    pub async fn add(&self, api: &dyn BiobankApi) -> Result<Self> {
        let body = json!({
            "courierName": self.courier_name,
            "trackingNumber": self.tracking_number,
            "fromLocationId": self.from_location_info.location_id,
            "toLocationId": self.to_location_info.location_id,
        });
        let reply = api.post("/shipments/", body).await?;
        Self::create(reply)
    }

    pub async fn remove(&self, api: &dyn BiobankApi) -> Result<()> {
        let path = format!("/shipments/{}/{}", self.id()?, self.meta.version);
        api.delete(&path).await?;
        Ok(())
    }

    pub async fn update_courier_name(&mut self, api: &dyn BiobankApi, courier_name: &str) -> Result<()> {
        let path = format!("/shipments/courier/{}", self.id()?);
        self.update(api, &path, json!({ "courierName": courier_name })).await
    }

    pub async fn update_tracking_number(
        &mut self,
        api: &dyn BiobankApi,
        tracking_number: &str,
    ) -> Result<()> {
        let path = format!("/shipments/trackingnumber/{}", self.id()?);
        self.update(api, &path, json!({ "trackingNumber": tracking_number }))
            .await
    }

    pub async fn update_from_location(&mut self, api: &dyn BiobankApi, location_id: &LocationId) -> Result<()> {
        let path = format!("/shipments/fromlocation/{}", self.id()?);
        self.update(api, &path, json!({ "locationId": location_id })).await
    }

    pub async fn update_to_location(&mut self, api: &dyn BiobankApi, location_id: &LocationId) -> Result<()> {
        let path = format!("/shipments/tolocation/{}", self.id()?);
        self.update(api, &path, json!({ "locationId": location_id })).await
    }

    /// Applies a state transition
    ///
    /// # Errors
    ///
    /// Fails without contacting the server if `transition` cannot start from
    /// the current state. Server rejections propagate unchanged and leave the
    /// shipment as it was.
    pub async fn transition(
        &mut self,
        api: &dyn BiobankApi,
        transition: ShipmentTransition,
        body: Value,
    ) -> Result<()> {
        if !transition.is_legal_from(self.state) {
            return Err(BiobankError::domain(format!(
                "cannot change shipment state from {} to {}",
                self.state,
                transition.target()
            )));
        }

        let id = self.id()?.clone();
        let from = self.state;
        let path = format!("/shipments/state/{}/{id}", transition.path_segment());
        self.update(api, &path, body).await?;
        crate::log_state_transition!("Shipment", id, from, self.state);
        Ok(())
    }

    /// Reverts a packed shipment so that it can be modified again
    pub async fn created(&mut self, api: &dyn BiobankApi) -> Result<()> {
        self.transition(api, ShipmentTransition::Created, Value::Null)
            .await
    }

    pub async fn pack(&mut self, api: &dyn BiobankApi, datetime: DateTime<Utc>) -> Result<()> {
        self.transition(api, ShipmentTransition::Pack, json!({ "datetime": timestamp(&datetime) }))
            .await
    }

    pub async fn send(&mut self, api: &dyn BiobankApi, datetime: DateTime<Utc>) -> Result<()> {
        self.transition(api, ShipmentTransition::Send, json!({ "datetime": timestamp(&datetime) }))
            .await
    }

    pub async fn receive(&mut self, api: &dyn BiobankApi, datetime: DateTime<Utc>) -> Result<()> {
        self.transition(
            api,
            ShipmentTransition::Receive,
            json!({ "datetime": timestamp(&datetime) }),
        )
        .await
    }

    pub async fn unpack(&mut self, api: &dyn BiobankApi, datetime: DateTime<Utc>) -> Result<()> {
        self.transition(
            api,
            ShipmentTransition::Unpack,
            json!({ "datetime": timestamp(&datetime) }),
        )
        .await
    }

    pub async fn lost(&mut self, api: &dyn BiobankApi) -> Result<()> {
        self.transition(api, ShipmentTransition::Lost, Value::Null).await
    }

    /// Moves a created shipment straight to SENT, recording both times
    pub async fn skip_to_state_sent(
        &mut self,
        api: &dyn BiobankApi,
        time_packed: DateTime<Utc>,
        time_sent: DateTime<Utc>,
    ) -> Result<()> {
        let body = json!({
            "timePacked": timestamp(&time_packed),
            "timeSent": timestamp(&time_sent),
        });
        self.transition(api, ShipmentTransition::SkipToSent, body).await
    }

    /// Moves a sent shipment straight to UNPACKED, recording both times
    pub async fn skip_to_state_unpacked(
        &mut self,
        api: &dyn BiobankApi,
        time_received: DateTime<Utc>,
        time_unpacked: DateTime<Utc>,
    ) -> Result<()> {
        let body = json!({
            "timeReceived": timestamp(&time_received),
            "timeUnpacked": timestamp(&time_unpacked),
        });
        self.transition(api, ShipmentTransition::SkipToUnpacked, body)
            .await
    }

    pub fn is_created(&self) -> bool {
        self.state == ShipmentState::Created
    }

    pub fn is_packed(&self) -> bool {
        self.state == ShipmentState::Packed
    }

    pub fn is_sent(&self) -> bool {
        self.state == ShipmentState::Sent
    }

    pub fn is_received(&self) -> bool {
        self.state == ShipmentState::Received
    }

    pub fn is_unpacked(&self) -> bool {
        self.state == ShipmentState::Unpacked
    }

    pub fn is_lost(&self) -> bool {
        self.state == ShipmentState::Lost
    }

    pub fn is_not_created_nor_unpacked(&self) -> bool {
        !self.is_created() && !self.is_unpacked()
    }

    /// Asks the server whether a specimen may be added to this shipment
    ///
    /// It may if it exists, sits at the location the shipment leaves from,
    /// and is not already in the shipment. The reply is that specimen.
    pub async fn can_add_inventory_id(&self, api: &dyn BiobankApi, inventory_id: &str) -> Result<Specimen> {
        if inventory_id.trim().is_empty() {
            return Err(BiobankError::domain("specimen inventory id not specified"));
        }
        let path = format!("/shipments/specimens/canadd/{}/{inventory_id}", self.id()?);
        let reply = api.get(&path, &Vec::new()).await?;
        Specimen::create(reply)
    }

    /// Adds specimens, optionally inside a container, and returns the refreshed shipment
    pub async fn add_specimens(
        &self,
        api: &dyn BiobankApi,
        inventory_ids: &[String],
        container_id: Option<&ShipmentContainerId>,
    ) -> Result<Self> {
        let mut body = json!({ "specimenInventoryIds": inventory_ids });
        if let Some(container_id) = container_id {
            body["shipmentContainerId"] = json!(container_id);
        }
        let reply = api
            .post(&format!("/shipments/specimens/{}", self.id()?), body)
            .await?;
        Self::create(reply)
    }

    /// Places specimens in a container, or takes them out of any container
    /// when `container_id` is `None`
    pub async fn update_shipment_container_on_specimens(
        &self,
        api: &dyn BiobankApi,
        shipment_specimens: &[ShipmentSpecimen],
        container_id: Option<&ShipmentContainerId>,
    ) -> Result<Self> {
        let data = shipment_specimens
            .iter()
            .map(|ss| -> Result<Value> {
                Ok(json!({
                    "shipmentSpecimenId": ss.id()?,
                    "expectedVersion": ss.version(),
                }))
            })
            .collect::<Result<Vec<Value>>>()?;

        let mut body = json!({ "shipmentSpecimenData": data });
        if let Some(container_id) = container_id {
            body["shipmentContainerId"] = json!(container_id);
        }
        let reply = api
            .post(&format!("/shipments/specimens/container/{}", self.id()?), body)
            .await?;
        Self::create(reply)
    }

    pub async fn tag_specimens_as_present(&self, api: &dyn BiobankApi, inventory_ids: &[String]) -> Result<Self> {
        self.tag_specimens(api, inventory_ids, ShipmentItemState::Present)
            .await
    }

    pub async fn tag_specimens_as_received(&self, api: &dyn BiobankApi, inventory_ids: &[String]) -> Result<Self> {
        self.tag_specimens(api, inventory_ids, ShipmentItemState::Received)
            .await
    }

    pub async fn tag_specimens_as_missing(&self, api: &dyn BiobankApi, inventory_ids: &[String]) -> Result<Self> {
        self.tag_specimens(api, inventory_ids, ShipmentItemState::Missing)
            .await
    }

    pub async fn tag_specimens_as_extra(&self, api: &dyn BiobankApi, inventory_ids: &[String]) -> Result<Self> {
        self.tag_specimens(api, inventory_ids, ShipmentItemState::Extra)
            .await
    }

    async fn tag_specimens(
        &self,
        api: &dyn BiobankApi,
        inventory_ids: &[String],
        item_state: ShipmentItemState,
    ) -> Result<Self> {
        if !self.is_unpacked() {
            return Err(BiobankError::domain(format!(
                "shipment is not unpacked: {}",
                self.state
            )));
        }
        let path = format!("/shipments/specimens/{item_state}/{}", self.id()?);
        let reply = api
            .post(&path, json!({ "specimenInventoryIds": inventory_ids }))
            .await?;
        Self::create(reply)
    }
}

/// Builder for shipments that have not been added to the server
#[derive(Debug, Default)]
pub struct ShipmentBuilder {
    courier_name: Option<String>,
    tracking_number: Option<String>,
    from_location_info: Option<CentreLocationInfo>,
    to_location_info: Option<CentreLocationInfo>,
}

impl ShipmentBuilder {
    pub fn courier_name(mut self, courier_name: impl Into<String>) -> Self {
        self.courier_name = Some(courier_name.into());
        self
    }

    pub fn tracking_number(mut self, tracking_number: impl Into<String>) -> Self {
        self.tracking_number = Some(tracking_number.into());
        self
    }

    pub fn from_location(mut self, info: CentreLocationInfo) -> Self {
        self.from_location_info = Some(info);
        self
    }

    pub fn to_location(mut self, info: CentreLocationInfo) -> Self {
        self.to_location_info = Some(info);
        self
    }

    /// Builds a shipment in CREATED state
    ///
    /// # Errors
    ///
    /// Returns an error if any field is missing
    pub fn build(self) -> std::result::Result<Shipment, String> {
        Ok(Shipment {
            meta: EntityMeta::new(),
            state: ShipmentState::Created,
            courier_name: self.courier_name.ok_or("courier_name is required")?,
            tracking_number: self.tracking_number.ok_or("tracking_number is required")?,
            from_location_info: self
                .from_location_info
                .ok_or("from_location_info is required")?,
            to_location_info: self.to_location_info.ok_or("to_location_info is required")?,
            time_packed: None,
            time_sent: None,
            time_received: None,
            time_unpacked: None,
        })
    }
}
