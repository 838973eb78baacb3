//! Sender side of the handover protocol.
//!
//! Drives an item from local user intent through offer, the recipient's
//! reaction (accept / reject / silence), to the final confirm-and-delete.

use tracing::{debug, info, warn};

use crate::core::item::ItemProperties;
use crate::core::protocol::{CancelCause, TransferKind, TransferMessage};
use crate::core::room::Participant;
use crate::core::transfer::record::{SenderState, SendingTransfer};
use crate::core::transfer::ItemTransferEngine;
use crate::ui::dialog;

impl ItemTransferEngine {
    /// Entry point: the local user dropped an item onto another
    /// participant (or picked "give" from a menu).
    ///
    /// Items that are already mid-transfer or explicitly flagged
    /// non-transferable get a warning notice and no record.
    pub fn initiate_transfer(&mut self, recipient: Participant, item: ItemProperties) {
        if !self.config.enabled {
            debug!(event = "transfer_disabled", "item handover is switched off");
            return;
        }

        let Some(item_id) = item.id().map(str::to_string) else {
            warn!(event = "initiate_without_item_id", "refusing to offer an item without an id");
            return;
        };

        if self.items_sending.contains_key(&item_id) || !item.is_transferable() {
            info!(
                event = "item_not_transferable",
                item_id = %item_id,
                in_flight = self.items_sending.contains_key(&item_id),
                "item cannot be offered"
            );
            self.dialogs.show(dialog::not_transferable_notice(
                item.label(),
                self.config.notice_duration,
            ));
            return;
        }

        info!(
            event = "transfer_initiated",
            item_id = %item_id,
            recipient = %recipient.address,
            "asking user to confirm the handover"
        );

        let question = dialog::send_confirm_question(&recipient, item.label());
        let mut record = SendingTransfer::new(recipient, item);
        record.dialog = Some(self.dialogs.show(question));
        self.items_sending.insert(item_id, record);
    }

    /// The local user answered the confirmation dialog (`agreed = false`
    /// also covers a dismissed dialog). Only valid while the record still
    /// asks the user; anything later is a stale callback and ignored.
    pub async fn confirm_send(&mut self, item_id: &str, agreed: bool) {
        if self.sending_state(item_id) != Some(SenderState::AskingUser) {
            debug!(event = "stale_send_confirmation", item_id = %item_id, "confirmation for a settled transfer");
            return;
        }

        if !agreed {
            info!(event = "transfer_declined_by_user", item_id = %item_id, "user kept the item");
            // The recipient was never informed; no message goes out.
            self.take_sending_if(item_id, SenderState::AskingUser);
            return;
        }

        // Time has passed while the dialog was open; refetch the
        // authoritative snapshot before it crosses the wire.
        let fresh = match self.inventory.properties(item_id).await {
            Ok(properties) => properties,
            Err(e) => {
                self.report_backpack_failure("properties", item_id, &e);
                self.take_sending(item_id);
                return;
            }
        };

        if !self.advance_sending(item_id, SenderState::AskingUser, SenderState::Offered) {
            return;
        }

        let Some(record) = self.items_sending.get_mut(item_id) else {
            return;
        };
        record.item = fresh;
        record.close_dialog();
        let recipient = record.recipient.clone();
        let item = record.item.clone();

        self.send_to(&recipient, &item, TransferKind::Offer, None);

        let wait = dialog::offer_wait_dialog(
            &recipient,
            item.label(),
            self.config.offer_wait_timeout(),
        );
        let handle = self.dialogs.show(wait);
        if let Some(record) = self.items_sending.get_mut(item_id) {
            record.dialog = Some(handle);
        }

        self.stats.offers_sent += 1;
        info!(
            event = "offer_sent",
            item_id = %item_id,
            recipient = %recipient.address,
            "offer sent, waiting for the recipient"
        );
    }

    /// The user canceled the wait dialog.
    pub fn cancel_offer_wait(&mut self, item_id: &str) {
        self.withdraw_offer(item_id, CancelCause::SenderCanceled, "offer_canceled_by_user");
    }

    /// The wait dialog expired without any reaction from the recipient.
    pub fn offer_wait_timed_out(&mut self, item_id: &str) {
        self.withdraw_offer(item_id, CancelCause::SenderTimeout, "offer_wait_expired");
    }

    fn withdraw_offer(&mut self, item_id: &str, cause: CancelCause, event: &'static str) {
        let Some(record) = self.take_sending_if(item_id, SenderState::Offered) else {
            return;
        };

        info!(
            event = event,
            item_id = %item_id,
            recipient = %record.recipient.address,
            cause = ?cause,
            "offer withdrawn"
        );

        self.send_to(&record.recipient, &record.item, TransferKind::Cancel, Some(cause));
        self.dialogs.show(dialog::sender_outcome_notice(
            cause,
            &record.recipient,
            record.item.label(),
            self.config.notice_duration,
        ));
        self.bump_cause_stats(cause);
    }

    /// The recipient declined, or its prompt lapsed.
    pub(crate) fn on_receive_reject(&mut self, msg: TransferMessage) {
        let item_id = msg.item_id().to_string();
        // A reject without a cause means the recipient's window lapsed.
        let cause = msg.cause.unwrap_or(CancelCause::RecipientTimeout);

        let Some(record) = self.take_sending_if(&item_id, SenderState::Offered) else {
            return;
        };

        info!(
            event = "offer_rejected",
            item_id = %item_id,
            recipient = %record.recipient.address,
            cause = ?cause,
            "recipient turned the offer down"
        );

        // The recipient already knows; no reply.
        self.dialogs.show(dialog::sender_outcome_notice(
            cause,
            &record.recipient,
            record.item.label(),
            self.config.notice_duration,
        ));
        self.bump_cause_stats(cause);
    }

    /// The recipient accepted: hand the item over for real.
    pub(crate) async fn on_receive_accept(&mut self, msg: TransferMessage) {
        let item_id = msg.item_id().to_string();
        if self.sending_state(&item_id) != Some(SenderState::Offered) {
            debug!(event = "stale_accept", item_id = %item_id, "accept for an unknown or settled transfer");
            return;
        }

        // Refetch so the recipient stores the latest authoritative state,
        // not the snapshot from when the offer was built.
        let fresh = match self.inventory.properties(&item_id).await {
            Ok(properties) => properties,
            Err(e) => {
                self.report_backpack_failure("properties", &item_id, &e);
                self.take_sending(&item_id);
                return;
            }
        };

        if self.sending_state(&item_id) != Some(SenderState::Offered) {
            return;
        }

        // Delete before confirming: a re-sent confirm can then never
        // duplicate the source item. The price is that a confirm lost in
        // transit loses the item, which the protocol accepts.
        if let Err(e) = self.inventory.delete(&item_id).await {
            self.report_backpack_failure("delete", &item_id, &e);
            self.take_sending(&item_id);
            return;
        }

        let Some(record) = self.take_sending_if(&item_id, SenderState::Offered) else {
            // Settled elsewhere while the delete was in flight. The local
            // copy is already gone; there is nothing left to undo.
            warn!(event = "accept_raced_cleanup", item_id = %item_id, "transfer settled during delete");
            return;
        };

        self.send_to(&record.recipient, &fresh, TransferKind::Confirm, None);
        self.dialogs.show(dialog::sent_notice(
            &record.recipient,
            fresh.label(),
            self.config.notice_duration,
        ));
        self.stats.items_given += 1;

        info!(
            event = "transfer_confirmed",
            item_id = %item_id,
            recipient = %record.recipient.address,
            "item deleted locally and confirm sent"
        );
    }
}
