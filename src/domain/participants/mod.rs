//! Participants, the visits recorded for them, and the specimens collected

pub mod collection_event;
pub mod participant;
pub mod specimen;

pub use collection_event::{CollectionEvent, COLLECTION_EVENT_SCHEMA};
pub use participant::{Participant, PARTICIPANT_SCHEMA};
pub use specimen::{Specimen, SpecimenState, SPECIMEN_SCHEMA};
