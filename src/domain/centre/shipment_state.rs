//! Shipment states and the transitions between them
//!
//! The table in [`ShipmentTransition::legal_from`] is the client-side copy
//! of the server's rules. It drives the guard that rejects an impossible
//! transition before any request is made; the server still has the last
//! word on every transition it receives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentState {
    Created,
    Packed,
    Sent,
    Received,
    Unpacked,
    Lost,
}

impl ShipmentState {
    pub const ALL: [ShipmentState; 6] = [
        ShipmentState::Created,
        ShipmentState::Packed,
        ShipmentState::Sent,
        ShipmentState::Received,
        ShipmentState::Unpacked,
        ShipmentState::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentState::Created => "created",
            ShipmentState::Packed => "packed",
            ShipmentState::Sent => "sent",
            ShipmentState::Received => "received",
            ShipmentState::Unpacked => "unpacked",
            ShipmentState::Lost => "lost",
        }
    }
}

impl fmt::Display for ShipmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a specimen inside a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentItemState {
    #[default]
    Present,
    Received,
    Missing,
    Extra,
}

impl ShipmentItemState {
    /// Path segment of the tagging endpoint for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentItemState::Present => "present",
            ShipmentItemState::Received => "received",
            ShipmentItemState::Missing => "missing",
            ShipmentItemState::Extra => "extra",
        }
    }
}

impl fmt::Display for ShipmentItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A state-changing operation on a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipmentTransition {
    Pack,
    Send,
    Receive,
    Unpack,
    Lost,
    /// Back to CREATED so the shipment can be edited again
    Created,
    SkipToSent,
    SkipToUnpacked,
}

impl ShipmentTransition {
    pub const ALL: [ShipmentTransition; 8] = [
        ShipmentTransition::Pack,
        ShipmentTransition::Send,
        ShipmentTransition::Receive,
        ShipmentTransition::Unpack,
        ShipmentTransition::Lost,
        ShipmentTransition::Created,
        ShipmentTransition::SkipToSent,
        ShipmentTransition::SkipToUnpacked,
    ];

    /// States this transition may start from
    pub fn legal_from(&self) -> &'static [ShipmentState] {
        use ShipmentState::*;
        match self {
            ShipmentTransition::Pack => &[Created, Sent],
            ShipmentTransition::Send => &[Packed, Received, Lost],
            ShipmentTransition::Receive => &[Sent, Unpacked],
            ShipmentTransition::Unpack => &[Received],
            ShipmentTransition::Lost => &[Sent],
            ShipmentTransition::Created => &[Packed],
            ShipmentTransition::SkipToSent => &[Created],
            ShipmentTransition::SkipToUnpacked => &[Sent],
        }
    }

    pub fn target(&self) -> ShipmentState {
        match self {
            ShipmentTransition::Pack => ShipmentState::Packed,
            ShipmentTransition::Send | ShipmentTransition::SkipToSent => ShipmentState::Sent,
            ShipmentTransition::Receive => ShipmentState::Received,
            ShipmentTransition::Unpack | ShipmentTransition::SkipToUnpacked => {
                ShipmentState::Unpacked
            }
            ShipmentTransition::Lost => ShipmentState::Lost,
            ShipmentTransition::Created => ShipmentState::Created,
        }
    }

    /// Segment following `/shipments/state/` in the endpoint path
    pub fn path_segment(&self) -> &'static str {
        match self {
            ShipmentTransition::Pack => "packed",
            ShipmentTransition::Send => "sent",
            ShipmentTransition::Receive => "received",
            ShipmentTransition::Unpack => "unpacked",
            ShipmentTransition::Lost => "lost",
            ShipmentTransition::Created => "created",
            ShipmentTransition::SkipToSent => "skip-to-sent",
            ShipmentTransition::SkipToUnpacked => "skip-to-unpacked",
        }
    }

    pub fn is_legal_from(&self, state: ShipmentState) -> bool {
        self.legal_from().contains(&state)
    }
}

impl fmt::Display for ShipmentTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
