//! Domain entities of the biobank.
//!
//! Every entity here mirrors one server resource. Instances are built from
//! server JSON through a schema check ([`schema::decode`]) and change only by
//! being replaced with the server's reply to a write, following the
//! optimistic-concurrency protocol of [`ConcurrencySafeEntity`].
//!
//! # Overview
//!
//! - **Identifiers** ([`StudyId`], [`ShipmentId`], ...) reject blank strings
//! - **Entities** ([`Study`], [`Centre`], [`Shipment`], [`User`], [`CollectionEvent`], ...)
//! - **Annotations**, the custom fields studies declare ([`annotations`])
//! - **Errors** ([`BiobankError`], [`ApiError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! ```rust
//! use biobank::domain::{CentreId, ShipmentId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let shipment_id = ShipmentId::new("s1")?;
//! let centre_id = CentreId::new("c1")?;
//!
//! // let wrong: CentreId = shipment_id;  // Compile error!
//! assert!(ShipmentId::new("  ").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Decoding server objects
//!
//! ```rust
//! use biobank::domain::{ConcurrencySafeEntity, User};
//! use serde_json::json;
//!
//! let err = User::create(json!({ "id": "u1", "version": 0 })).unwrap_err();
//! assert!(err.to_string().starts_with("invalid object from server"));
//! ```

pub mod annotations;
pub mod centre;
pub mod entity;
pub mod errors;
pub mod ids;
pub mod paged;
pub mod participants;
pub mod result;
pub mod schema;
pub mod study;
pub mod user;

pub use annotations::{
    AnnotatedEntity, Annotation, AnnotationEntry, AnnotationType, AnnotationValue,
    AnnotationValueType, ServerAnnotation,
};
pub use centre::{
    Centre, CentreLocationInfo, CentreState, Location, Shipment, ShipmentBuilder,
    ShipmentItemState, ShipmentSpecimen, ShipmentState, ShipmentTransition,
};
pub use entity::{ConcurrencySafeEntity, EntityMeta};
pub use errors::{ApiError, BiobankError};
pub use ids::{
    AnnotationTypeId, CentreId, CollectionEventId, CollectionEventTypeId, LocationId,
    ParticipantId, ShipmentContainerId, ShipmentId, ShipmentSpecimenId, SpecimenId, StudyId,
    UserId,
};
pub use paged::{ListOptions, PagedResult, SortOrder};
pub use participants::{CollectionEvent, Participant, Specimen, SpecimenState};
pub use result::Result;
pub use study::{CollectionEventType, Study, StudyStatus};
pub use user::{User, UserState};
