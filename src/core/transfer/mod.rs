//! ItemTransferEngine: sole coordinator of the handover protocol.
//!
//! This is the single source of truth for:
//! - The two in-flight transfer maps (one per role), keyed by item id
//! - Sender and recipient state machines
//! - Cleanup discipline (dialogs closed, timers canceled, records removed)
//! - Handover statistics
//!
//! **Architecture rule**: no transfer logic may exist outside this module
//! tree. The room layer delivers raw messages; the dialog layer reports
//! user decisions; the engine decides everything.
//!
//! **Concurrency model**: one event loop owns the engine; there is no
//! parallelism and no locking. Suspension points are the async backpack
//! calls — between issuing one and its continuation running, any other
//! event may have mutated the same record. Every handler therefore
//! (1) looks its record up, (2) compares the current state against the
//! state it expects, (3) treats a mismatch as a silent no-op, and
//! (4) repeats the check after every await. The state tag is the sole
//! correctness mechanism against interleaving.

mod record;
mod recipient;
mod sender;

pub use record::{ReceivingTransfer, RecipientState, SenderState, SendingTransfer};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::core::config::TransferConfig;
use crate::core::inventory::Inventory;
use crate::core::item::{ItemId, ItemProperties};
use crate::core::protocol::{self, CancelCause, TransferKind};
use crate::core::room::{ChatMessage, Participant, RoomLink};
use crate::core::timers::TimerHost;
use crate::ui::dialog::DialogHost;

// ── Statistics ───────────────────────────────────────────────────────────────

/// Lifetime counters for the local session, read by the UI.
#[derive(Debug, Default, Clone)]
pub struct TransferStats {
    pub offers_sent: u64,
    pub offers_received: u64,
    /// Transfers that completed with the local user as sender.
    pub items_given: u64,
    /// Transfers that completed with the local user as recipient.
    pub items_taken: u64,
    pub rejections: u64,
    pub cancellations: u64,
    pub timeouts: u64,
    /// Inbound transfer elements dropped by the strict decoder.
    pub dropped_messages: u64,
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// The handover protocol engine. One instance per local user session.
pub struct ItemTransferEngine {
    config: TransferConfig,
    room: Arc<dyn RoomLink>,
    inventory: Arc<dyn Inventory>,
    dialogs: Arc<dyn DialogHost>,
    timers: Arc<dyn TimerHost>,
    /// Transfers where the local user is the sender.
    items_sending: HashMap<ItemId, SendingTransfer>,
    /// Transfers where the local user is the recipient.
    items_receiving: HashMap<ItemId, ReceivingTransfer>,
    stats: TransferStats,
}

impl ItemTransferEngine {
    pub fn new(
        config: TransferConfig,
        room: Arc<dyn RoomLink>,
        inventory: Arc<dyn Inventory>,
        dialogs: Arc<dyn DialogHost>,
        timers: Arc<dyn TimerHost>,
    ) -> Self {
        Self {
            config,
            room,
            inventory,
            dialogs,
            timers,
            items_sending: HashMap::new(),
            items_receiving: HashMap::new(),
            stats: TransferStats::default(),
        }
    }

    // ── Queries (read-only, for UI rendering) ────────────────────────────

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    pub fn sending_count(&self) -> usize {
        self.items_sending.len()
    }

    pub fn receiving_count(&self) -> usize {
        self.items_receiving.len()
    }

    // ── Message dispatch ─────────────────────────────────────────────────

    /// Entry point for every inbound chat message. Non-transfer messages
    /// and anything the strict decoder refuses are ignored; valid
    /// messages dispatch on an exhaustive match over the type.
    pub async fn handle_message(&mut self, msg: &ChatMessage) {
        if msg.transfer.is_none() {
            return;
        }

        let Some(transfer) = protocol::decode(self.room.as_ref(), msg) else {
            self.stats.dropped_messages += 1;
            return;
        };

        match transfer.kind {
            TransferKind::Offer => self.on_receive_offer(transfer),
            TransferKind::Accept => self.on_receive_accept(transfer).await,
            TransferKind::Reject => self.on_receive_reject(transfer),
            TransferKind::Cancel => self.on_receive_cancel(transfer),
            TransferKind::Confirm => self.on_receive_confirm(transfer).await,
        }
    }

    // ── State guards ─────────────────────────────────────────────────────
    //
    // Dialog callbacks, timers, and network messages can all fire "late",
    // after a record has already moved on via a different path. Each
    // helper is a guarded mutation: state mismatch means the transition
    // already happened elsewhere, and the caller backs off.

    pub(crate) fn sending_state(&self, item_id: &str) -> Option<SenderState> {
        self.items_sending.get(item_id).map(|r| r.state)
    }

    pub(crate) fn receiving_state(&self, item_id: &str) -> Option<RecipientState> {
        self.items_receiving.get(item_id).map(|r| r.state)
    }

    /// Advance a sending record from `expected` to `next`, or report a
    /// stale caller.
    pub(crate) fn advance_sending(
        &mut self,
        item_id: &str,
        expected: SenderState,
        next: SenderState,
    ) -> bool {
        match self.items_sending.get_mut(item_id) {
            Some(record) if record.state == expected => {
                record.state = next;
                true
            }
            other => {
                debug!(
                    event = "stale_sender_transition",
                    item_id = %item_id,
                    expected = ?expected,
                    actual = ?other.map(|r| r.state),
                    "sender transition skipped, record already moved on"
                );
                false
            }
        }
    }

    /// Remove a sending record if it is still in `expected`, tearing down
    /// its dialog. Returns the record for any final message or notice.
    pub(crate) fn take_sending_if(
        &mut self,
        item_id: &str,
        expected: SenderState,
    ) -> Option<SendingTransfer> {
        if self.sending_state(item_id) != Some(expected) {
            debug!(
                event = "stale_sender_cleanup",
                item_id = %item_id,
                expected = ?expected,
                "sender cleanup skipped, record absent or already moved on"
            );
            return None;
        }
        let mut record = self.items_sending.remove(item_id)?;
        record.state = SenderState::Cleanup;
        record.close_dialog();
        Some(record)
    }

    pub(crate) fn advance_receiving(
        &mut self,
        item_id: &str,
        expected: RecipientState,
        next: RecipientState,
    ) -> bool {
        match self.items_receiving.get_mut(item_id) {
            Some(record) if record.state == expected => {
                record.state = next;
                true
            }
            other => {
                debug!(
                    event = "stale_recipient_transition",
                    item_id = %item_id,
                    expected = ?expected,
                    actual = ?other.map(|r| r.state),
                    "recipient transition skipped, record already moved on"
                );
                false
            }
        }
    }

    /// Remove a receiving record if it is still in `expected`, closing its
    /// dialog and canceling its pending timer exactly once.
    pub(crate) fn take_receiving_if(
        &mut self,
        item_id: &str,
        expected: RecipientState,
    ) -> Option<ReceivingTransfer> {
        if self.receiving_state(item_id) != Some(expected) {
            debug!(
                event = "stale_recipient_cleanup",
                item_id = %item_id,
                expected = ?expected,
                "recipient cleanup skipped, record absent or already moved on"
            );
            return None;
        }
        self.take_receiving(item_id)
    }

    /// Unconditional removal for paths valid from more than one state
    /// (cancel receipt) and for forced cleanup after backpack failures.
    pub(crate) fn take_receiving(&mut self, item_id: &str) -> Option<ReceivingTransfer> {
        let mut record = self.items_receiving.remove(item_id)?;
        record.state = RecipientState::Cleanup;
        record.close_dialog();
        record.cancel_timeout();
        Some(record)
    }

    /// Forced sender-side cleanup regardless of state (backpack failures).
    pub(crate) fn take_sending(&mut self, item_id: &str) -> Option<SendingTransfer> {
        let mut record = self.items_sending.remove(item_id)?;
        record.state = SenderState::Cleanup;
        record.close_dialog();
        Some(record)
    }

    // ── Shared plumbing ──────────────────────────────────────────────────

    pub(crate) fn send_to(
        &self,
        to: &Participant,
        item: &ItemProperties,
        kind: TransferKind,
        cause: Option<CancelCause>,
    ) {
        self.room.send(to, protocol::encode(item, kind, cause));
    }

    /// Report a failed backpack call. The record is forced into cleanup
    /// by the caller; the user gets no explanation beyond the generic
    /// error surface.
    pub(crate) fn report_backpack_failure(&self, op: &str, item_id: &str, error: &anyhow::Error) {
        error!(
            event = "backpack_call_failed",
            op,
            item_id = %item_id,
            error = %error,
            "backpack call failed, abandoning transfer"
        );
    }

    pub(crate) fn bump_cause_stats(&mut self, cause: CancelCause) {
        match cause {
            CancelCause::SenderTimeout | CancelCause::RecipientTimeout => self.stats.timeouts += 1,
            CancelCause::SenderCanceled => self.stats.cancellations += 1,
            CancelCause::RecipientRejected => self.stats.rejections += 1,
        }
    }
}
