//! Domain identifier types with validation
//!
//! Every server-assigned identifier gets its own newtype so that a
//! `ShipmentId` can never be passed where a `CentreId` is expected. All of
//! them reject blank strings, both when built directly and when decoded from
//! server JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " from a string")]
            ///
            /// # Errors
            ///
            /// Returns an error if the identifier is empty or only whitespace
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a study
    StudyId,
    "Study ID"
);
entity_id!(
    /// Identifier of a centre
    CentreId,
    "Centre ID"
);
entity_id!(
    /// Identifier of a location within a centre
    LocationId,
    "Location ID"
);
entity_id!(
    /// Identifier of a shipment
    ShipmentId,
    "Shipment ID"
);
entity_id!(
    /// Identifier of a specimen's membership in a shipment
    ShipmentSpecimenId,
    "Shipment specimen ID"
);
entity_id!(
    /// Identifier of a container travelling inside a shipment
    ShipmentContainerId,
    "Shipment container ID"
);
entity_id!(
    /// Identifier of a specimen
    SpecimenId,
    "Specimen ID"
);
entity_id!(
    /// Identifier of a user
    UserId,
    "User ID"
);
entity_id!(
    /// Identifier of a participant
    ParticipantId,
    "Participant ID"
);
entity_id!(
    /// Identifier of a collection event
    CollectionEventId,
    "Collection event ID"
);
entity_id!(
    /// Identifier of a collection event type
    CollectionEventTypeId,
    "Collection event type ID"
);
entity_id!(
    /// Identifier of an annotation type
    ///
    /// Annotation types are value objects owned by their parent entity, so this
    /// is the `uniqueId` the server assigns when the type is added.
    AnnotationTypeId,
    "Annotation type ID"
);
