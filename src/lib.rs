// Biobank Client - specimen tracking domain layer
// Copyright (c) 2025 Biobank Contributors
// Licensed under the MIT License

//! # Biobank client
//!
//! Domain entity layer for a biobank specimen-tracking system, talking to the
//! biobank REST server.
//!
//! ## Overview
//!
//! This library provides:
//! - **Entities** for studies, centres, shipments, participants, collection
//!   events, specimens and users, each validated against a schema when built
//!   from server JSON
//! - **Optimistic concurrency**: every write carries the entity version and
//!   replaces the local object with the server's reply only on success
//! - **Annotations**: typed custom fields declared by studies
//! - **The shipment workflow**: CREATED → PACKED → SENT → RECEIVED →
//!   UNPACKED, plus LOST and the skip transitions
//!
//! ## Architecture
//!
//! - [`domain`] - Entities, identifiers, schemas and errors
//! - [`adapters`] - The REST boundary ([`adapters::api::BiobankApi`]) and its HTTP client
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use biobank::adapters::api::HttpApi;
//! use biobank::config::load_config;
//! use biobank::domain::{Shipment, ShipmentId};
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("biobank.toml")?;
//!     let _guard = biobank::logging::init_logging(&config.application.log_level, &config.logging)?;
//!
//!     let api = HttpApi::new(&config.api)?;
//!     let mut shipment = Shipment::get(&api, &ShipmentId::new("s1")?).await?;
//!     if shipment.is_created() {
//!         shipment.pack(&api, Utc::now()).await?;
//!     }
//!     println!("shipment is now {}", shipment.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. Client-side guards
//! fail with [`domain::BiobankError::Domain`] before any request is sent;
//! server rejections, including stale-version conflicts, arrive as
//! [`domain::BiobankError::Api`] and are never retried.
//!
//! ```rust
//! use biobank::domain::{BiobankError, ConcurrencySafeEntity, Shipment};
//! use serde_json::json;
//!
//! let result = Shipment::create(json!({ "id": "s1" }));
//! assert!(matches!(result, Err(BiobankError::InvalidServerObject(_))));
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
