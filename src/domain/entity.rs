//! Common base for server-backed entities
//!
//! Every mutable entity carries an [`EntityMeta`] (identity, version and
//! timestamps) and implements [`ConcurrencySafeEntity`], which provides the
//! optimistic-concurrency `update` protocol: the current version travels as
//! `expectedVersion`, the server answers with the full new representation,
//! and the local object is replaced only once that reply has been validated.

use super::errors::BiobankError;
use super::result::Result;
use super::schema::{self, Schema};
use crate::adapters::api::BiobankApi;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;

/// Identity and concurrency fields shared by all entities
///
/// Flattened into each entity's JSON form, so it reads and writes the
/// server's `id`, `version`, `timeAdded` and `timeModified` members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "Id: Deserialize<'de>"))]
pub struct EntityMeta<Id> {
    /// Absent until the server has persisted the entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub time_added: Option<DateTime<Utc>>,

    #[serde(default)]
    pub time_modified: Option<DateTime<Utc>>,
}

impl<Id> EntityMeta<Id> {
    /// Metadata for an entity that has not been persisted yet
    pub fn new() -> Self {
        Self {
            id: None,
            version: 0,
            time_added: None,
            time_modified: None,
        }
    }

    /// Returns true if the server has never seen this entity
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl<Id> Default for EntityMeta<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity whose writes are guarded by a version number
///
/// Implementors provide their schema and access to their metadata; `create`,
/// `id` and `update` come for free. Entities that hold local bindings not
/// present in the server's JSON (an annotation type list, say) override
/// [`carry_over`](Self::carry_over) so those bindings survive an update.
#[async_trait]
pub trait ConcurrencySafeEntity: Sized + Send + Sync + Serialize + DeserializeOwned {
    /// Identifier type
    type Id: Clone + Display + Send + Sync;

    /// Shape every server representation must satisfy
    const SCHEMA: &'static Schema;

    /// Identity and version fields
    fn meta(&self) -> &EntityMeta<Self::Id>;

    /// Builds an entity from a plain server object
    ///
    /// # Errors
    ///
    /// Returns [`BiobankError::InvalidServerObject`] if the object does not
    /// satisfy [`SCHEMA`](Self::SCHEMA) or cannot be decoded.
    fn create(obj: Value) -> Result<Self> {
        schema::decode(obj, Self::SCHEMA)
    }

    /// Moves local bindings from `self` onto the freshly decoded `updated`
    fn carry_over(&self, _updated: &mut Self) -> Result<()> {
        Ok(())
    }

    /// Current version
    fn version(&self) -> u64 {
        self.meta().version
    }

    /// Identifier of a persisted entity
    ///
    /// # Errors
    ///
    /// Returns a domain error for an entity that has not been added yet.
    fn id(&self) -> Result<&Self::Id> {
        self.meta()
            .id
            .as_ref()
            .ok_or_else(|| BiobankError::domain(format!("{} has not been persisted", Self::SCHEMA.id)))
    }

    /// Applies a server-side mutation and adopts the server's reply
    ///
    /// `body` must be a JSON object or `null`; `expectedVersion` is added to
    /// it. On any failure `self` is left exactly as it was.
    async fn update(&mut self, api: &dyn BiobankApi, path: &str, body: Value) -> Result<()> {
        let mut fields = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(BiobankError::domain(format!(
                    "update body must be an object, got {other}"
                )))
            }
        };
        fields.insert("expectedVersion".to_string(), Value::from(self.version()));

        let reply = api.post(path, Value::Object(fields)).await?;
        let mut updated = Self::create(reply)?;
        self.carry_over(&mut updated)?;
        *self = updated;
        Ok(())
    }
}

/// Serializes a timestamp the way the server expects it
pub(crate) fn timestamp(datetime: &DateTime<Utc>) -> Value {
    Value::String(datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
