//! Centre locations and the location summary embedded in other entities

use crate::domain::ids::{CentreId, LocationId};
use crate::domain::schema::{Kind, Property, Schema};
use serde::{Deserialize, Serialize};

pub static CENTRE_LOCATION_INFO_SCHEMA: Schema = Schema {
    id: "CentreLocationInfo",
    properties: &[
        Property::new("centreId", Kind::String),
        Property::new("locationId", Kind::String),
        Property::new("name", Kind::String),
    ],
    required: &["centreId", "locationId", "name"],
};

pub static LOCATION_SCHEMA: Schema = Schema {
    id: "Location",
    properties: &[
        Property::new("id", Kind::String),
        Property::new("name", Kind::String),
        Property::new("street", Kind::String),
        Property::new("city", Kind::String),
        Property::new("province", Kind::String),
        Property::new("postalCode", Kind::String),
        Property::new("poBoxNumber", Kind::String).nullable(),
        Property::new("countryIsoCode", Kind::String),
    ],
    required: &["id", "name", "street", "city", "province", "postalCode", "countryIsoCode"],
};

/// Where something is: a centre, one of its locations, and a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreLocationInfo {
    pub centre_id: CentreId,
    pub location_id: LocationId,
    /// Combined centre and location name
    pub name: String,
}

/// A physical address belonging to a centre
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Assigned by the server when the location is added to its centre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LocationId>,
    pub name: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    #[serde(default)]
    pub po_box_number: Option<String>,
    pub country_iso_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::validate;
    use serde_json::json;

    #[test]
    fn test_location_info_schema() {
        let info = json!({ "centreId": "c1", "locationId": "l1", "name": "CBSR: Freezer" });
        assert!(validate(&info, &CENTRE_LOCATION_INFO_SCHEMA).is_ok());
        let decoded: CentreLocationInfo = serde_json::from_value(info).unwrap();
        assert_eq!(decoded.location_id.as_str(), "l1");
    }

    #[test]
    fn test_new_location_serializes_without_id() {
        let location = Location {
            name: "Lab".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&location).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["postalCode"], "");
    }
}
