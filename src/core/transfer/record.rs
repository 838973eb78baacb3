//! In-flight transfer records.
//!
//! One record per item per role, exclusively owned by the engine for its
//! lifetime. The embedded item snapshot is a copy; the record also owns
//! whatever dialog is currently open for the transfer and, on the
//! recipient side, the pending confirm-wait timer.

use crate::core::item::ItemProperties;
use crate::core::room::Participant;
use crate::core::timers::TimerHandle;
use crate::ui::dialog::DialogHandle;

// ── States ───────────────────────────────────────────────────────────────────

/// Lifecycle of a transfer where the local user is the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Confirmation dialog open; the recipient knows nothing yet.
    AskingUser,
    /// Offer sent, waiting for the recipient's reaction.
    Offered,
    /// Terminal marker set while the record is torn down, so any stale
    /// continuation still holding the item id observes a mismatch.
    Cleanup,
}

/// Lifecycle of a transfer where the local user is the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientState {
    /// Offer received, accept/decline prompt open.
    AskingUser,
    /// Accept sent, confirm-wait timer armed.
    Accepted,
    /// Terminal teardown marker.
    Cleanup,
}

// ── Records ──────────────────────────────────────────────────────────────────

/// Tracked state for one outbound transfer.
pub struct SendingTransfer {
    pub recipient: Participant,
    /// Snapshot taken when the transfer was initiated, refreshed from the
    /// backpack right before the offer and right before the confirm.
    pub item: ItemProperties,
    pub state: SenderState,
    /// The confirmation or wait dialog currently open, if any.
    pub dialog: Option<Box<dyn DialogHandle>>,
}

impl SendingTransfer {
    pub fn new(recipient: Participant, item: ItemProperties) -> Self {
        Self {
            recipient,
            item,
            state: SenderState::AskingUser,
            dialog: None,
        }
    }

    /// Close the open dialog, if any. Idempotent.
    pub fn close_dialog(&mut self) {
        if let Some(mut dialog) = self.dialog.take() {
            dialog.close();
        }
    }
}

/// Tracked state for one inbound transfer.
pub struct ReceivingTransfer {
    pub sender: Participant,
    /// Snapshot from the offer; replaced by the confirm's snapshot when
    /// the item is stored.
    pub item: ItemProperties,
    pub state: RecipientState,
    pub dialog: Option<Box<dyn DialogHandle>>,
    /// Armed while in [`RecipientState::Accepted`]; canceled exactly once
    /// during cleanup.
    pub confirm_timeout: Option<Box<dyn TimerHandle>>,
}

impl ReceivingTransfer {
    pub fn new(sender: Participant, item: ItemProperties) -> Self {
        Self {
            sender,
            item,
            state: RecipientState::AskingUser,
            dialog: None,
            confirm_timeout: None,
        }
    }

    pub fn close_dialog(&mut self) {
        if let Some(mut dialog) = self.dialog.take() {
            dialog.close();
        }
    }

    /// Cancel the pending confirm-wait timer, if armed. Idempotent.
    pub fn cancel_timeout(&mut self) {
        if let Some(mut timer) = self.confirm_timeout.take() {
            timer.cancel();
        }
    }
}
