//! Room collaborator seam.
//!
//! The room/presence layer is owned by the embedding application. The
//! engine only needs two capabilities from it: send an addressed, typed
//! element to one participant, and resolve an inbound message's sender
//! address back to a live participant.

use serde::{Deserialize, Serialize};

use crate::core::protocol::TransferElement;

/// One member of the room, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Room-unique address used for directed messages.
    pub address: String,
    /// Human-readable name used in dialogs.
    pub display_name: String,
}

impl Participant {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
        }
    }
}

/// The logical inbound envelope: one addressed chat message as handed to
/// the engine by the room layer. The transfer schema rides in an optional
/// extension element next to whatever chat body the message carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Address of the sending participant.
    pub from: String,
    /// Transfer extension element, if the message carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferElement>,
}

/// Outbound messaging and sender resolution, implemented by the room
/// layer.
///
/// `send` is fire-and-forget: the transport gives no delivery
/// confirmation, which is why the engine pairs every wait with a timeout.
pub trait RoomLink: Send + Sync {
    /// Send an addressed transfer element to one participant.
    fn send(&self, to: &Participant, element: TransferElement);

    /// Resolve a message's sender address to a participant still present
    /// in the room, or `None` if unknown / already departed.
    fn resolve_participant(&self, address: &str) -> Option<Participant>;
}
