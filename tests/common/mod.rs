//! In-memory stand-in for the biobank server shared by the integration tests
//!
//! `FakeServer` records every request. Shipments registered with
//! [`FakeServer::with_shipment`] are driven by a small simulation of the
//! server's workflow rules; every other request is answered from a queue of
//! canned replies.

#![allow(dead_code)]

use async_trait::async_trait;
use biobank::adapters::api::{BiobankApi, Query};
use biobank::domain::{ApiError, Result, ShipmentState, ShipmentTransition};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct FakeServer {
    requests: Mutex<Vec<Request>>,
    replies: Mutex<VecDeque<std::result::Result<Value, ApiError>>>,
    shipments: Mutex<HashMap<String, Value>>,
    states: Mutex<HashMap<String, Vec<ShipmentState>>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shipment whose state changes are simulated
    pub fn with_shipment(self, shipment: Value) -> Self {
        let id = shipment["id"].as_str().unwrap_or_default().to_string();
        let state: ShipmentState = serde_json::from_value(shipment["state"].clone()).unwrap();
        self.states.lock().unwrap().insert(id.clone(), vec![state]);
        self.shipments.lock().unwrap().insert(id, shipment);
        self
    }

    pub fn push_reply(&self, reply: Value) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: ApiError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// States the simulated shipment went through, starting with its initial one
    pub fn state_history(&self, shipment_id: &str) -> Vec<ShipmentState> {
        self.states
            .lock()
            .unwrap()
            .get(shipment_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, method: Method, path: &str, body: Value) {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            body,
        });
    }

    fn canned(&self) -> Result<Value> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(error)) => Err(error.into()),
            None => Err(ApiError::InvalidRequest("no reply queued".to_string()).into()),
        }
    }

    fn shipment_transition(&self, segment: &str, id: &str, body: &Value) -> Option<Result<Value>> {
        let transition = ShipmentTransition::ALL
            .into_iter()
            .find(|t| t.path_segment() == segment)?;
        let mut shipments = self.shipments.lock().unwrap();
        let shipment = shipments.get_mut(id)?;

        let version = shipment["version"].as_u64().unwrap_or_default();
        if body["expectedVersion"].as_u64() != Some(version) {
            return Some(Err(ApiError::Conflict(format!(
                "expected version doesn't match current version: {id}"
            ))
            .into()));
        }

        let state: ShipmentState = serde_json::from_value(shipment["state"].clone()).unwrap();
        if !transition.is_legal_from(state) {
            return Some(Err(ApiError::ClientError {
                status: 400,
                message: format!("InvalidState: cannot change to {}", transition.target()),
            }
            .into()));
        }

        let target = transition.target();
        match transition {
            ShipmentTransition::Pack => shipment["timePacked"] = body["datetime"].clone(),
            ShipmentTransition::Send => shipment["timeSent"] = body["datetime"].clone(),
            ShipmentTransition::Receive => shipment["timeReceived"] = body["datetime"].clone(),
            ShipmentTransition::Unpack => shipment["timeUnpacked"] = body["datetime"].clone(),
            ShipmentTransition::Created => shipment["timePacked"] = Value::Null,
            ShipmentTransition::SkipToSent => {
                shipment["timePacked"] = body["timePacked"].clone();
                shipment["timeSent"] = body["timeSent"].clone();
            }
            ShipmentTransition::SkipToUnpacked => {
                shipment["timeReceived"] = body["timeReceived"].clone();
                shipment["timeUnpacked"] = body["timeUnpacked"].clone();
            }
            ShipmentTransition::Lost => {}
        }
        shipment["state"] = json!(target);
        shipment["version"] = json!(version + 1);
        shipment["timeModified"] = json!("2024-03-01T00:00:00Z");

        self.states
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push(target);
        Some(Ok(shipment.clone()))
    }
}

#[async_trait]
impl BiobankApi for FakeServer {
    async fn get(&self, path: &str, _query: &Query) -> Result<Value> {
        self.record(Method::Get, path, Value::Null);
        if let Some(id) = path.strip_prefix("/shipments/") {
            if let Some(shipment) = self.shipments.lock().unwrap().get(id) {
                return Ok(shipment.clone());
            }
        }
        self.canned()
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.record(Method::Post, path, body.clone());
        if let Some(rest) = path.strip_prefix("/shipments/state/") {
            if let Some((segment, id)) = rest.split_once('/') {
                if let Some(reply) = self.shipment_transition(segment, id, &body) {
                    return reply;
                }
            }
        }
        self.canned()
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.record(Method::Delete, path, Value::Null);
        self.canned()
    }
}

pub fn location_info(centre: &str, location: &str) -> Value {
    json!({
        "centreId": centre,
        "locationId": location,
        "name": format!("{centre}: {location}")
    })
}

pub fn shipment_json(id: &str, state: &str) -> Value {
    json!({
        "id": id,
        "version": 0,
        "timeAdded": "2024-01-01T00:00:00Z",
        "timeModified": null,
        "state": state,
        "courierName": "FedEx",
        "trackingNumber": "T1",
        "fromLocationInfo": location_info("c1", "l1"),
        "toLocationInfo": location_info("c2", "l2"),
        "timePacked": null,
        "timeSent": null,
        "timeReceived": null,
        "timeUnpacked": null
    })
}

pub fn study_json(status: &str, version: u64) -> Value {
    json!({
        "id": "st1",
        "version": version,
        "timeAdded": "2024-01-01T00:00:00Z",
        "timeModified": null,
        "name": "ABC",
        "description": null,
        "annotationTypes": [],
        "status": status
    })
}

pub fn user_json(state: &str, version: u64) -> Value {
    json!({
        "id": "u1",
        "version": version,
        "timeAdded": "2024-01-01T00:00:00Z",
        "name": "Jo Doe",
        "email": "jo@example.com",
        "avatarUrl": null,
        "state": state
    })
}
