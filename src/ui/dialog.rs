//! User-facing dialogs and notices for the handover flow.
//!
//! The engine never draws anything itself: it builds a [`DialogSpec`] and
//! hands it to the embedding application's [`DialogHost`]. All user-visible
//! transfer messages MUST go through this module — verbose details belong
//! in `tracing` logs, not in dialogs.
//!
//! Question dialogs route the user's answer back into the engine: the host
//! calls the matching engine method (`confirm_send`, `respond_to_offer`,
//! `cancel_offer_wait`, ...) from the event loop that owns the engine.
//! A dialog that times out or is closed without a choice is reported the
//! same way, with the handler's state guard absorbing anything stale.

use std::time::Duration;

use crate::core::protocol::CancelCause;
use crate::core::room::Participant;
use crate::ui::text::Translatable;

// ── Notice Level ─────────────────────────────────────────────────────────────

/// Severity of a user-facing dialog or notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral informational message (e.g. "Waiting…").
    Info,
    /// Positive outcome (e.g. "Item sent").
    Success,
    /// Non-critical issue (e.g. "Declined", "Timed out").
    Warning,
    /// Actionable error.
    Error,
}

impl NoticeLevel {
    /// Single-glyph prefix for quick visual scanning.
    pub fn icon(self) -> &'static str {
        match self {
            NoticeLevel::Info => "(i)",
            NoticeLevel::Success => "",
            NoticeLevel::Warning => "(x)",
            NoticeLevel::Error => "(!)",
        }
    }
}

// ── Dialog specification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// Needs an answer; carries buttons.
    Question,
    /// Informational toast; auto-expires.
    Notice,
}

/// Buttons a question dialog may carry, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Yes,
    No,
    Cancel,
}

/// Everything the host needs to present one dialog or notice.
#[derive(Debug, Clone)]
pub struct DialogSpec {
    pub kind: DialogKind,
    pub level: NoticeLevel,
    pub title: Translatable,
    pub text: Translatable,
    pub buttons: Vec<DialogButton>,
    /// Auto-dismiss delay; the host reports expiry of a question dialog
    /// like a dismissal.
    pub timeout: Option<Duration>,
    /// Whether the user may permanently suppress this dialog class.
    pub suppressible: bool,
}

/// A shown dialog that can be closed programmatically.
pub trait DialogHandle: Send {
    /// Close the dialog if still open. Idempotent.
    fn close(&mut self);
}

/// Presents dialogs and notices; implemented by the embedding UI.
pub trait DialogHost: Send + Sync {
    fn show(&self, spec: DialogSpec) -> Box<dyn DialogHandle>;
}

// ── Orchestration helpers ────────────────────────────────────────────────────
//
// One builder per user-facing moment of the protocol. Texts are key
// lookups with English fallbacks, parameterized by sender name, recipient
// name, and item label.

fn title() -> Translatable {
    Translatable::key("itemtransfer.title", "Item transfer")
}

fn with_names(
    node: Translatable,
    sender: Option<&Participant>,
    recipient: Option<&Participant>,
    item_label: &str,
) -> Translatable {
    let mut substitutions = vec![("item", Translatable::text(item_label))];
    if let Some(p) = sender {
        substitutions.push(("sender", Translatable::text(p.display_name.as_str())));
    }
    if let Some(p) = recipient {
        substitutions.push(("recipient", Translatable::text(p.display_name.as_str())));
    }
    node.with(substitutions)
}

/// Yes/no question confirming the local user's intent to send.
pub fn send_confirm_question(recipient: &Participant, item_label: &str) -> DialogSpec {
    DialogSpec {
        kind: DialogKind::Question,
        level: NoticeLevel::Info,
        title: title(),
        text: with_names(
            Translatable::key(
                "itemtransfer.sender.confirmQuestion",
                "Hand {item} to {recipient}?",
            ),
            None,
            Some(recipient),
            item_label,
        ),
        buttons: vec![DialogButton::Yes, DialogButton::No],
        timeout: None,
        suppressible: false,
    }
}

/// Cancelable "waiting for response" dialog shown after the offer went out.
pub fn offer_wait_dialog(
    recipient: &Participant,
    item_label: &str,
    timeout: Duration,
) -> DialogSpec {
    DialogSpec {
        kind: DialogKind::Question,
        level: NoticeLevel::Info,
        title: title(),
        text: with_names(
            Translatable::key(
                "itemtransfer.sender.waiting",
                "Waiting for {recipient} to take {item}…",
            ),
            None,
            Some(recipient),
            item_label,
        ),
        buttons: vec![DialogButton::Cancel],
        timeout: Some(timeout),
        suppressible: false,
    }
}

/// Accept/decline question shown to the recipient of an offer.
pub fn offer_question(sender: &Participant, item_label: &str, timeout: Duration) -> DialogSpec {
    DialogSpec {
        kind: DialogKind::Question,
        level: NoticeLevel::Info,
        title: title(),
        text: with_names(
            Translatable::key(
                "itemtransfer.recipient.offerQuestion",
                "{sender} wants to hand you {item}. Take it?",
            ),
            Some(sender),
            None,
            item_label,
        ),
        buttons: vec![DialogButton::Yes, DialogButton::No],
        timeout: Some(timeout),
        suppressible: false,
    }
}

fn notice(level: NoticeLevel, text: Translatable, duration: Duration) -> DialogSpec {
    DialogSpec {
        kind: DialogKind::Notice,
        level,
        title: title(),
        text,
        buttons: Vec::new(),
        timeout: Some(duration),
        suppressible: true,
    }
}

/// Warning that an item cannot be offered (mid-transfer or flagged
/// non-transferable).
pub fn not_transferable_notice(item_label: &str, duration: Duration) -> DialogSpec {
    notice(
        NoticeLevel::Warning,
        with_names(
            Translatable::key(
                "itemtransfer.sender.notTransferable",
                "{item} cannot be handed over right now.",
            ),
            None,
            None,
            item_label,
        ),
        duration,
    )
}

/// Success notice on the sender after the confirm went out.
pub fn sent_notice(recipient: &Participant, item_label: &str, duration: Duration) -> DialogSpec {
    notice(
        NoticeLevel::Success,
        with_names(
            Translatable::key("itemtransfer.sender.sent", "{recipient} took {item}."),
            None,
            Some(recipient),
            item_label,
        ),
        duration,
    )
}

/// Sender-side outcome notice, keyed by why the transfer ended.
pub fn sender_outcome_notice(
    cause: CancelCause,
    recipient: &Participant,
    item_label: &str,
    duration: Duration,
) -> DialogSpec {
    let text = match cause {
        CancelCause::SenderTimeout => Translatable::key(
            "itemtransfer.sender.senderTimeout",
            "{recipient} did not respond; {item} stays with you.",
        ),
        CancelCause::SenderCanceled => Translatable::key(
            "itemtransfer.sender.senderCanceled",
            "Offer withdrawn; {item} stays with you.",
        ),
        CancelCause::RecipientTimeout => Translatable::key(
            "itemtransfer.sender.recipientTimeout",
            "{recipient} let the offer expire; {item} stays with you.",
        ),
        CancelCause::RecipientRejected => Translatable::key(
            "itemtransfer.sender.recipientRejected",
            "{recipient} declined {item}.",
        ),
    };
    notice(
        NoticeLevel::Warning,
        with_names(text, None, Some(recipient), item_label),
        duration,
    )
}

/// Success notice on the recipient after the item was stored.
pub fn received_notice(sender: &Participant, item_label: &str, duration: Duration) -> DialogSpec {
    notice(
        NoticeLevel::Success,
        with_names(
            Translatable::key("itemtransfer.recipient.received", "You took {item} from {sender}."),
            Some(sender),
            None,
            item_label,
        ),
        duration,
    )
}

/// Recipient notice when the confirm never arrived.
pub fn not_received_notice(sender: &Participant, item_label: &str, duration: Duration) -> DialogSpec {
    notice(
        NoticeLevel::Warning,
        with_names(
            Translatable::key(
                "itemtransfer.recipient.notReceived",
                "{item} never arrived from {sender}.",
            ),
            Some(sender),
            None,
            item_label,
        ),
        duration,
    )
}

/// Recipient notice when the sender withdrew or timed out.
pub fn offer_canceled_notice(
    cause: CancelCause,
    sender: &Participant,
    item_label: &str,
    duration: Duration,
) -> DialogSpec {
    let text = match cause {
        CancelCause::SenderTimeout => Translatable::key(
            "itemtransfer.recipient.senderTimeout",
            "The offer of {item} from {sender} expired.",
        ),
        _ => Translatable::key(
            "itemtransfer.recipient.senderCanceled",
            "{sender} withdrew the offer of {item}.",
        ),
    };
    notice(
        NoticeLevel::Warning,
        with_names(text, Some(sender), None, item_label),
        duration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::text::StringTable;

    fn alice() -> Participant {
        Participant::new("alice@room", "Alice")
    }

    #[test]
    fn test_questions_carry_buttons_and_notices_do_not() {
        let q = offer_question(&alice(), "Lamp", Duration::from_secs(30));
        assert_eq!(q.kind, DialogKind::Question);
        assert_eq!(q.buttons, vec![DialogButton::Yes, DialogButton::No]);
        assert_eq!(q.timeout, Some(Duration::from_secs(30)));

        let n = sent_notice(&alice(), "Lamp", Duration::from_secs(8));
        assert_eq!(n.kind, DialogKind::Notice);
        assert!(n.buttons.is_empty());
        assert_eq!(n.level, NoticeLevel::Success);
    }

    #[test]
    fn test_wait_dialog_is_cancelable() {
        let d = offer_wait_dialog(&alice(), "Lamp", Duration::from_secs(40));
        assert_eq!(d.buttons, vec![DialogButton::Cancel]);
        assert_eq!(d.timeout, Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_fallback_text_substitutes_names() {
        let table = StringTable::new();
        let q = send_confirm_question(&alice(), "Blue Lamp");
        assert_eq!(table.resolve(&q.text), "Hand Blue Lamp to Alice?");

        let n = sender_outcome_notice(
            CancelCause::RecipientRejected,
            &alice(),
            "Blue Lamp",
            Duration::from_secs(8),
        );
        assert_eq!(table.resolve(&n.text), "Alice declined Blue Lamp.");
    }

    #[test]
    fn test_outcome_notice_varies_by_cause() {
        let table = StringTable::new();
        let timeout = sender_outcome_notice(
            CancelCause::SenderTimeout,
            &alice(),
            "Lamp",
            Duration::from_secs(8),
        );
        let declined = sender_outcome_notice(
            CancelCause::RecipientRejected,
            &alice(),
            "Lamp",
            Duration::from_secs(8),
        );
        assert_ne!(table.resolve(&timeout.text), table.resolve(&declined.text));
    }
}
