//! Centres, their locations, and the shipments that move specimens between them

pub mod centre;
pub mod location;
pub mod shipment;
pub mod shipment_specimen;
pub mod shipment_state;

pub use centre::{Centre, CentreState, CENTRE_SCHEMA};
pub use location::{CentreLocationInfo, Location, CENTRE_LOCATION_INFO_SCHEMA, LOCATION_SCHEMA};
pub use shipment::{Shipment, ShipmentBuilder, SHIPMENT_SCHEMA};
pub use shipment_specimen::{ShipmentSpecimen, SHIPMENT_SPECIMEN_SCHEMA};
pub use shipment_state::{ShipmentItemState, ShipmentState, ShipmentTransition};
