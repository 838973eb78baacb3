//! Wire schema and codec for the handover protocol.
//!
//! A transfer message is a small element carried inside an addressed chat
//! message. Decoding is strict rather than permissive: any structural
//! violation drops the message as "not handled" instead of guessing
//! intent — a corrupted or spoofed element must never reach the state
//! machine. Encoding filters the item snapshot down to its identifier for
//! every message type except `offer` and `confirm`, the only two moments
//! the full item content crosses the wire.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::item::ItemProperties;
use crate::core::room::{ChatMessage, Participant, RoomLink};

/// Namespace tag identifying the transfer extension element.
pub const TRANSFER_NS: &str = "vp:transfer";

// ── Enums ────────────────────────────────────────────────────────────────────

/// The five message types of the handover protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferKind {
    /// Sender proposes a transfer; carries the full item snapshot.
    Offer,
    /// Recipient agrees to take the item.
    Accept,
    /// Recipient declines (or its prompt expired); carries a cause.
    Reject,
    /// Sender aborts an offered, not-yet-confirmed transfer; carries a cause.
    Cancel,
    /// Sender's final message after acceptance; carries the full snapshot
    /// and triggers recipient-side storage.
    Confirm,
}

impl TransferKind {
    fn from_wire(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            TransferKind::Offer => "offer",
            TransferKind::Accept => "accept",
            TransferKind::Reject => "reject",
            TransferKind::Cancel => "cancel",
            TransferKind::Confirm => "confirm",
        }
    }

    /// Only `offer` and `confirm` carry the full item snapshot.
    pub fn carries_full_item(self) -> bool {
        matches!(self, TransferKind::Offer | TransferKind::Confirm)
    }
}

/// Why a transfer was rejected or canceled. Present iff the message type
/// is `reject` or `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelCause {
    /// The sender's wait window expired (also used by the recipient when
    /// its offer prompt auto-dismissed — historical wire vocabulary,
    /// preserved for compatibility).
    SenderTimeout,
    /// The sender explicitly withdrew the offer.
    SenderCanceled,
    /// The recipient's confirm wait expired.
    RecipientTimeout,
    /// The recipient explicitly declined.
    RecipientRejected,
}

impl CancelCause {
    fn from_wire(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            CancelCause::SenderTimeout => "senderTimeout",
            CancelCause::SenderCanceled => "senderCanceled",
            CancelCause::RecipientTimeout => "recipientTimeout",
            CancelCause::RecipientRejected => "recipientRejected",
        }
    }
}

// ── Wire element ─────────────────────────────────────────────────────────────

/// The transfer extension element as it travels inside a chat message.
///
/// Fields are loosely typed strings on the wire; [`decode`] is the only
/// path from here into the engine and enforces enum membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferElement {
    pub xmlns: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub item: ItemProperties,
}

// ── Decoded message ──────────────────────────────────────────────────────────

/// A validated inbound transfer message, ready for the state machine.
#[derive(Debug, Clone)]
pub struct TransferMessage {
    /// The participant the message came from.
    pub sender: Participant,
    pub kind: TransferKind,
    /// Item snapshot; full for offer/confirm, identifier-only otherwise.
    pub item: ItemProperties,
    /// Present on reject/cancel. May legitimately be absent on the wire;
    /// handlers apply their defensive defaults.
    pub cause: Option<CancelCause>,
}

impl TransferMessage {
    /// The item identifier. Guaranteed present by [`decode`].
    pub fn item_id(&self) -> &str {
        self.item.id().unwrap_or_default()
    }
}

// ── Codec ────────────────────────────────────────────────────────────────────

/// Decode an inbound chat message into a transfer message.
///
/// Returns `None` ("not handled") when the message carries no transfer
/// element, the namespace is foreign, the sender cannot be resolved, the
/// item lacks an identifier, or the type/cause strings fall outside the
/// known vocabulary. The caller treats `None` as "not for us", never as
/// an error — other message kinds share the same envelope.
pub fn decode(room: &dyn RoomLink, msg: &ChatMessage) -> Option<TransferMessage> {
    let element = msg.transfer.as_ref()?;

    if element.xmlns != TRANSFER_NS {
        return None;
    }

    let Some(sender) = room.resolve_participant(&msg.from) else {
        debug!(event = "transfer_sender_unresolved", from = %msg.from, "dropping transfer element from unknown participant");
        return None;
    };

    if element.item.id().map_or(true, str::is_empty) {
        debug!(event = "transfer_item_without_id", from = %msg.from, "dropping transfer element without item id");
        return None;
    }

    let Some(kind) = TransferKind::from_wire(&element.kind) else {
        debug!(event = "transfer_unknown_type", kind = %element.kind, "dropping transfer element with unknown type");
        return None;
    };

    // A present cause must be valid; an absent one is allowed and left to
    // the handlers' defensive defaults.
    let cause = match &element.cause {
        Some(raw) => match CancelCause::from_wire(raw) {
            Some(cause) => Some(cause),
            None => {
                debug!(event = "transfer_unknown_cause", cause = %raw, "dropping transfer element with unknown cause");
                return None;
            }
        },
        None => None,
    };

    Some(TransferMessage {
        sender,
        kind,
        item: element.item.clone(),
        cause,
    })
}

/// Encode an outbound transfer element.
///
/// The snapshot is reduced to identifier-only unless the message type is
/// one of the two that carry full item content.
pub fn encode(item: &ItemProperties, kind: TransferKind, cause: Option<CancelCause>) -> TransferElement {
    let item = if kind.carries_full_item() {
        item.clone()
    } else {
        item.to_id_only()
    };

    TransferElement {
        xmlns: TRANSFER_NS.to_string(),
        kind: kind.as_wire().to_string(),
        cause: cause.map(|c| c.as_wire().to_string()),
        item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::KEY_LABEL;

    struct FixedRoom;

    impl RoomLink for FixedRoom {
        fn send(&self, _to: &Participant, _element: TransferElement) {}

        fn resolve_participant(&self, address: &str) -> Option<Participant> {
            (address == "alice@room").then(|| Participant::new("alice@room", "Alice"))
        }
    }

    fn full_item() -> ItemProperties {
        let mut item = ItemProperties::from_id("item-9");
        item.set(KEY_LABEL, "Red Chair");
        item.set("provider", "nine3q");
        item
    }

    fn wrap(element: TransferElement) -> ChatMessage {
        ChatMessage {
            from: "alice@room".to_string(),
            transfer: Some(element),
        }
    }

    #[test]
    fn test_roundtrip_offer() {
        let element = encode(&full_item(), TransferKind::Offer, None);
        let msg = decode(&FixedRoom, &wrap(element)).unwrap();
        assert_eq!(msg.kind, TransferKind::Offer);
        assert_eq!(msg.sender.display_name, "Alice");
        assert_eq!(msg.item_id(), "item-9");
        // Offer carries the full snapshot.
        assert_eq!(msg.item.get("provider").and_then(|v| v.as_str()), Some("nine3q"));
    }

    #[test]
    fn test_encode_filters_to_id_except_offer_confirm() {
        let item = full_item();
        for kind in [TransferKind::Accept, TransferKind::Reject, TransferKind::Cancel] {
            let cause = matches!(kind, TransferKind::Reject | TransferKind::Cancel)
                .then_some(CancelCause::RecipientRejected);
            let element = encode(&item, kind, cause);
            assert_eq!(element.item.id(), Some("item-9"), "{kind:?}");
            assert_eq!(element.item.0.len(), 1, "{kind:?} must be id-only");
        }
        for kind in [TransferKind::Offer, TransferKind::Confirm] {
            let element = encode(&item, kind, None);
            assert!(element.item.get("provider").is_some(), "{kind:?} must carry full item");
        }
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let mut element = encode(&full_item(), TransferKind::Offer, None);
        element.kind = "borrow".to_string();
        assert!(decode(&FixedRoom, &wrap(element)).is_none());
    }

    #[test]
    fn test_decode_rejects_unknown_cause() {
        let mut element = encode(&full_item(), TransferKind::Reject, Some(CancelCause::RecipientRejected));
        element.cause = Some("boredom".to_string());
        assert!(decode(&FixedRoom, &wrap(element)).is_none());
    }

    #[test]
    fn test_decode_allows_absent_cause() {
        let mut element = encode(&full_item(), TransferKind::Reject, Some(CancelCause::RecipientRejected));
        element.cause = None;
        let msg = decode(&FixedRoom, &wrap(element)).unwrap();
        assert_eq!(msg.kind, TransferKind::Reject);
        assert!(msg.cause.is_none());
    }

    #[test]
    fn test_decode_rejects_missing_item_id() {
        let mut element = encode(&full_item(), TransferKind::Offer, None);
        element.item.0.remove("id");
        assert!(decode(&FixedRoom, &wrap(element)).is_none());
    }

    #[test]
    fn test_decode_rejects_foreign_namespace() {
        let mut element = encode(&full_item(), TransferKind::Offer, None);
        element.xmlns = "vp:poke".to_string();
        assert!(decode(&FixedRoom, &wrap(element)).is_none());
    }

    #[test]
    fn test_decode_rejects_unresolved_sender() {
        let element = encode(&full_item(), TransferKind::Offer, None);
        let msg = ChatMessage {
            from: "ghost@room".to_string(),
            transfer: Some(element),
        };
        assert!(decode(&FixedRoom, &msg).is_none());
    }

    #[test]
    fn test_decode_ignores_plain_chat() {
        let msg = ChatMessage {
            from: "alice@room".to_string(),
            transfer: None,
        };
        assert!(decode(&FixedRoom, &msg).is_none());
    }

    #[test]
    fn test_wire_vocabulary() {
        assert_eq!(TransferKind::Offer.as_wire(), "offer");
        assert_eq!(TransferKind::from_wire("confirm"), Some(TransferKind::Confirm));
        assert_eq!(CancelCause::SenderTimeout.as_wire(), "senderTimeout");
        assert_eq!(
            CancelCause::from_wire("recipientRejected"),
            Some(CancelCause::RecipientRejected)
        );
        assert_eq!(CancelCause::from_wire("sender_timeout"), None);
    }
}
