//! Recipient side of the handover protocol.
//!
//! Drives a received offer through the user's accept/decline choice and
//! the confirm wait, to the final store-and-notice.

use tracing::{debug, info, warn};

use crate::core::protocol::{CancelCause, TransferKind, TransferMessage};
use crate::core::transfer::record::{ReceivingTransfer, RecipientState};
use crate::core::transfer::ItemTransferEngine;
use crate::ui::dialog;

impl ItemTransferEngine {
    /// An offer arrived. Duplicate offers for an item already being
    /// received are ignored without any reaction, so a retransmitted
    /// offer cannot open a second prompt.
    pub(crate) fn on_receive_offer(&mut self, msg: TransferMessage) {
        if !self.config.enabled {
            debug!(event = "offer_ignored_disabled", "item handover is switched off");
            return;
        }

        let item_id = msg.item_id().to_string();
        if self.items_receiving.contains_key(&item_id) {
            debug!(event = "duplicate_offer_ignored", item_id = %item_id, "offer already in flight");
            return;
        }

        info!(
            event = "offer_received",
            item_id = %item_id,
            sender = %msg.sender.address,
            "asking user to accept or decline"
        );

        let question = dialog::offer_question(
            &msg.sender,
            msg.item.label(),
            self.config.recipient_accept_timeout,
        );
        let mut record = ReceivingTransfer::new(msg.sender, msg.item);
        record.dialog = Some(self.dialogs.show(question));
        self.items_receiving.insert(item_id, record);
        self.stats.offers_received += 1;
    }

    /// The local user answered the offer prompt.
    pub fn respond_to_offer(&mut self, item_id: &str, accepted: bool) {
        if !accepted {
            let Some(record) = self.take_receiving_if(item_id, RecipientState::AskingUser) else {
                return;
            };
            info!(
                event = "offer_declined",
                item_id = %item_id,
                sender = %record.sender.address,
                "user declined the offer"
            );
            self.send_to(
                &record.sender,
                &record.item,
                TransferKind::Reject,
                Some(CancelCause::RecipientRejected),
            );
            self.stats.rejections += 1;
            return;
        }

        if !self.advance_receiving(item_id, RecipientState::AskingUser, RecipientState::Accepted) {
            return;
        }

        let Some(record) = self.items_receiving.get_mut(item_id) else {
            return;
        };
        record.close_dialog();
        let sender = record.sender.clone();
        let item = record.item.clone();

        // Arm the confirm wait before telling the sender, so the timeout
        // exists from the first moment a confirm could be under way.
        let timer = self
            .timers
            .arm(item_id.to_string(), self.config.recipient_confirm_timeout);
        if let Some(record) = self.items_receiving.get_mut(item_id) {
            record.confirm_timeout = Some(timer);
        }

        self.send_to(&sender, &item, TransferKind::Accept, None);

        info!(
            event = "offer_accepted",
            item_id = %item_id,
            sender = %sender.address,
            "accept sent, waiting for the confirm"
        );
    }

    /// The offer prompt expired without an answer.
    pub fn offer_prompt_timed_out(&mut self, item_id: &str) {
        let Some(record) = self.take_receiving_if(item_id, RecipientState::AskingUser) else {
            return;
        };

        info!(
            event = "offer_prompt_expired",
            item_id = %item_id,
            sender = %record.sender.address,
            "offer prompt lapsed without an answer"
        );

        // On the wire an unanswered prompt reads as the sender's offer
        // window expiring; that cause name is part of the protocol.
        self.send_to(
            &record.sender,
            &record.item,
            TransferKind::Reject,
            Some(CancelCause::SenderTimeout),
        );
        self.stats.timeouts += 1;
    }

    /// The confirm never arrived; give up waiting. No outbound message —
    /// the sender has its own timeout and already knows the transfer may
    /// be stuck.
    pub fn confirm_wait_timed_out(&mut self, item_id: &str) {
        let Some(record) = self.take_receiving_if(item_id, RecipientState::Accepted) else {
            return;
        };

        info!(
            event = "confirm_wait_expired",
            item_id = %item_id,
            sender = %record.sender.address,
            "confirm never arrived"
        );

        self.dialogs.show(dialog::not_received_notice(
            &record.sender,
            record.item.label(),
            self.config.notice_duration,
        ));
        self.stats.timeouts += 1;
    }

    /// The sender withdrew the offer (explicitly or by timeout). Valid
    /// both while the prompt is open and after the accept went out.
    pub(crate) fn on_receive_cancel(&mut self, msg: TransferMessage) {
        let item_id = msg.item_id().to_string();
        let cause = msg.cause.unwrap_or(CancelCause::SenderCanceled);

        match self.receiving_state(&item_id) {
            Some(RecipientState::AskingUser) | Some(RecipientState::Accepted) => {}
            other => {
                debug!(
                    event = "stale_cancel",
                    item_id = %item_id,
                    state = ?other,
                    "cancel for an unknown or settled transfer"
                );
                return;
            }
        }

        let Some(record) = self.take_receiving(&item_id) else {
            return;
        };

        info!(
            event = "offer_canceled_by_sender",
            item_id = %item_id,
            sender = %record.sender.address,
            cause = ?cause,
            "sender withdrew the offer"
        );

        self.dialogs.show(dialog::offer_canceled_notice(
            cause,
            &record.sender,
            record.item.label(),
            self.config.notice_duration,
        ));
        self.bump_cause_stats(cause);
    }

    /// The sender's confirm arrived: store the item.
    pub(crate) async fn on_receive_confirm(&mut self, msg: TransferMessage) {
        let item_id = msg.item_id().to_string();
        if self.receiving_state(&item_id) != Some(RecipientState::Accepted) {
            debug!(event = "stale_confirm", item_id = %item_id, "confirm for an unknown or settled transfer");
            return;
        }

        // Duplicate-confirm defense: a retransmission must never
        // duplicate the item in the backpack.
        let already_stored = match self.inventory.contains(&item_id).await {
            Ok(present) => present,
            Err(e) => {
                self.report_backpack_failure("contains", &item_id, &e);
                self.take_receiving(&item_id);
                return;
            }
        };

        if self.receiving_state(&item_id) != Some(RecipientState::Accepted) {
            return;
        }

        if !already_stored {
            let snapshot = msg.item.stripped_for_storage();
            if let Err(e) = self.inventory.add(&item_id, snapshot).await {
                self.report_backpack_failure("add", &item_id, &e);
                self.take_receiving(&item_id);
                return;
            }
        } else {
            debug!(event = "duplicate_confirm", item_id = %item_id, "item already stored, skipping add");
        }

        let Some(record) = self.take_receiving_if(&item_id, RecipientState::Accepted) else {
            warn!(event = "confirm_raced_cleanup", item_id = %item_id, "transfer settled during store");
            return;
        };

        self.dialogs.show(dialog::received_notice(
            &record.sender,
            record.item.label(),
            self.config.notice_duration,
        ));
        self.stats.items_taken += 1;

        info!(
            event = "item_received",
            item_id = %item_id,
            sender = %record.sender.address,
            "item stored in the backpack"
        );
    }
}
