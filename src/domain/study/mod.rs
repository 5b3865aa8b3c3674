//! Studies and the collection event types they declare

pub mod collection_event_type;
pub mod study;

pub use collection_event_type::{CollectionEventType, COLLECTION_EVENT_TYPE_SCHEMA};
pub use study::{Study, StudyStatus, STUDY_SCHEMA};
