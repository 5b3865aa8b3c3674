//! User entity and its registration lifecycle

use crate::adapters::api::BiobankApi;
use crate::config::SecretString;
use crate::domain::entity::{ConcurrencySafeEntity, EntityMeta};
use crate::domain::errors::BiobankError;
use crate::domain::ids::UserId;
use crate::domain::paged::{ListOptions, PagedResult};
use crate::domain::result::Result;
use crate::domain::schema::{Kind, Property, Schema};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

pub static USER_SCHEMA: Schema = Schema {
    id: "User",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("version", Kind::Integer).minimum(0),
        Property::new("timeAdded", Kind::String),
        Property::new("timeModified", Kind::String).nullable(),
        Property::new("name", Kind::String),
        Property::new("email", Kind::String),
        Property::new("avatarUrl", Kind::String).nullable(),
        Property::new("state", Kind::String),
    ],
    required: &["id", "version", "timeAdded", "name", "email", "state"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    #[default]
    Registered,
    Active,
    Locked,
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserState::Registered => "registered",
            UserState::Active => "active",
            UserState::Locked => "locked",
        };
        f.write_str(s)
    }
}

/// A person allowed to log into the biobank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: EntityMeta<UserId>,

    pub name: String,

    pub email: String,

    #[serde(default)]
    pub avatar_url: Option<String>,

    pub state: UserState,
}

impl ConcurrencySafeEntity for User {
    type Id = UserId;
    const SCHEMA: &'static Schema = &USER_SCHEMA;

    fn meta(&self) -> &EntityMeta<UserId> {
        &self.meta
    }
}

impl User {
    /// A user that has not registered yet
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            email: email.into(),
            avatar_url: None,
            state: UserState::Registered,
        }
    }

    pub async fn get(api: &dyn BiobankApi, id: &UserId) -> Result<Self> {
        let reply = api.get(&format!("/users/{id}"), &Vec::new()).await?;
        Self::create(reply)
    }

    pub async fn list(api: &dyn BiobankApi, options: &ListOptions) -> Result<PagedResult<Self>> {
        let reply = api.get("/users/", &options.to_query()).await?;
        PagedResult::from_reply(reply, "users", Self::create)
    }

    /// Registers this user with `password` and returns the persisted copy
    pub async fn register(&self, api: &dyn BiobankApi, password: &SecretString) -> Result<Self> {
        let body = json!({
            "name": self.name,
            "email": self.email,
            "password": password.expose_secret(),
            "avatarUrl": self.avatar_url,
        });
        let reply = api.post("/users/", body).await?;
        Self::create(reply)
    }

    pub async fn update_name(&mut self, api: &dyn BiobankApi, name: &str) -> Result<()> {
        let path = format!("/users/name/{}", self.id()?);
        self.update(api, &path, json!({ "name": name })).await
    }

    pub async fn update_email(&mut self, api: &dyn BiobankApi, email: &str) -> Result<()> {
        let path = format!("/users/email/{}", self.id()?);
        self.update(api, &path, json!({ "email": email })).await
    }

    pub async fn update_password(
        &mut self,
        api: &dyn BiobankApi,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<()> {
        let path = format!("/users/password/{}", self.id()?);
        let body = json!({
            "currentPassword": current_password.expose_secret(),
            "newPassword": new_password.expose_secret(),
        });
        self.update(api, &path, body).await
    }

    pub async fn update_avatar_url(&mut self, api: &dyn BiobankApi, avatar_url: Option<&str>) -> Result<()> {
        let path = format!("/users/avatarurl/{}", self.id()?);
        self.update(api, &path, json!({ "avatarUrl": avatar_url }))
            .await
    }

    pub fn is_registered(&self) -> bool {
        self.state == UserState::Registered
    }

    pub fn is_active(&self) -> bool {
        self.state == UserState::Active
    }

    pub fn is_locked(&self) -> bool {
        self.state == UserState::Locked
    }

    pub async fn activate(&mut self, api: &dyn BiobankApi) -> Result<()> {
        self.require_state(UserState::Registered)?;
        self.change_state(api, "activate").await
    }

    pub async fn lock(&mut self, api: &dyn BiobankApi) -> Result<()> {
        self.require_state(UserState::Active)?;
        self.change_state(api, "lock").await
    }

    pub async fn unlock(&mut self, api: &dyn BiobankApi) -> Result<()> {
        self.require_state(UserState::Locked)?;
        self.change_state(api, "unlock").await
    }

    fn require_state(&self, state: UserState) -> Result<()> {
        if self.state != state {
            return Err(BiobankError::domain(format!(
                "user state is not {state}: {}",
                self.state
            )));
        }
        Ok(())
    }

    async fn change_state(&mut self, api: &dyn BiobankApi, action: &str) -> Result<()> {
        let id = self.id()?.clone();
        let path = format!("/users/{action}/{id}");
        let from = self.state;
        self.update(api, &path, json!({ "id": id })).await?;
        crate::log_state_transition!("User", id, from, self.state);
        Ok(())
    }
}
