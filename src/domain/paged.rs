//! List options and paged replies

use super::errors::BiobankError;
use super::result::Result;
use crate::adapters::api::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Sort direction for list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Query options accepted by the paged list endpoints
///
/// # Example
///
/// ```
/// use biobank::domain::paged::{ListOptions, SortOrder};
///
/// let options = ListOptions::new().sort("courierName").page(2).order(SortOrder::Desc);
/// let query = options.to_query();
/// assert!(query.contains(&("page".to_string(), "2".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order: Option<SortOrder>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Query parameters for the request; empty strings are left out
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        let mut push = |key: &str, value: String| {
            if !value.is_empty() {
                query.push((key.to_string(), value));
            }
        };

        if let Some(filter) = &self.filter {
            push("filter", filter.clone());
        }
        if let Some(sort) = &self.sort {
            push("sort", sort.clone());
        }
        if let Some(page) = self.page {
            push("page", page.to_string());
        }
        if let Some(limit) = self.limit {
            push("limit", limit.to_string());
        }
        if let Some(order) = self.order {
            push("order", order.to_string());
        }
        query
    }
}

/// One page of a list reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub max_pages: u32,
}

impl<T> PagedResult<T> {
    /// Builds a paged result from a server reply, converting each item
    ///
    /// # Errors
    ///
    /// If the reply is not a paged result or any single item fails
    /// `create`, the whole list is rejected with
    /// [`BiobankError::InvalidServerList`] naming `things`.
    pub fn from_reply(
        reply: Value,
        things: &str,
        create: impl Fn(Value) -> Result<T>,
    ) -> Result<Self> {
        let raw: PagedResult<Value> = serde_json::from_value(reply)
            .map_err(|_| BiobankError::InvalidServerList(things.to_string()))?;

        let items = raw
            .items
            .into_iter()
            .map(&create)
            .collect::<Result<Vec<T>>>()
            .map_err(|e| {
                tracing::error!(things = things, error = %e, "Rejecting list reply");
                BiobankError::InvalidServerList(things.to_string())
            })?;

        Ok(PagedResult {
            items,
            total: raw.total,
            page: raw.page,
            limit: raw.limit,
            offset: raw.offset,
            max_pages: raw.max_pages,
        })
    }
}

/// Converts an unpaged array reply, item by item
///
/// # Errors
///
/// Same rejection rule as [`PagedResult::from_reply`].
pub fn list_from_reply<T>(
    reply: Value,
    things: &str,
    create: impl Fn(Value) -> Result<T>,
) -> Result<Vec<T>> {
    let Value::Array(items) = reply else {
        return Err(BiobankError::InvalidServerList(things.to_string()));
    };
    items
        .into_iter()
        .map(create)
        .collect::<Result<Vec<T>>>()
        .map_err(|e| {
            tracing::error!(things = things, error = %e, "Rejecting list reply");
            BiobankError::InvalidServerList(things.to_string())
        })
}
