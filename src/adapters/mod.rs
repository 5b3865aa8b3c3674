//! Integrations with systems outside the domain layer.
//!
//! - [`api`] - the biobank REST server: the [`BiobankApi`](api::BiobankApi)
//!   seam every entity operation goes through, and its reqwest-backed
//!   [`HttpApi`](api::HttpApi) implementation
//!
//! ```rust,no_run
//! use biobank::adapters::api::HttpApi;
//! use biobank::config::ApiConfig;
//! use biobank::domain::{ShipmentId, Shipment};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpApi::new(&ApiConfig {
//!     base_url: "https://biobank.example.com/api".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let shipment = Shipment::get(&api, &ShipmentId::new("s1")?).await?;
//! println!("{} is {}", shipment.courier_name, shipment.state);
//! # Ok(())
//! # }
//! ```

pub mod api;
