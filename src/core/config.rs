//! Centralized configuration for the item handover protocol.
//!
//! All tunable parameters live here so they can be reviewed and adjusted
//! in a single place. The engine resolves a [`TransferConfig`] once at
//! construction; nothing else in the crate reads timeouts.

use std::time::Duration;

// ── Defaults ─────────────────────────────────────────────────────────────────

/// How long the recipient's accept/decline prompt stays open before it
/// auto-dismisses and the offer is declined.
pub const RECIPIENT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the recipient waits for the sender's confirm after accepting.
/// When this expires the recipient gives up without sending anything —
/// the sender has its own wait timeout and already knows the transfer
/// may be stuck.
pub const RECIPIENT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Margin added on top of [`RECIPIENT_ACCEPT_TIMEOUT`] for the sender's
/// "waiting for response" dialog, covering message relay latency in both
/// directions.
pub const SENDER_OFFER_WAIT_EXTRA: Duration = Duration::from_secs(10);

/// How long outcome notices (sent / received / declined / timed out)
/// stay visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(8);

// ── TransferConfig ───────────────────────────────────────────────────────────

/// Resolved configuration handed to the engine at construction.
///
/// Every timeout the protocol needs is a field here, so a missing value
/// is a compile error rather than a runtime lookup failure.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Master switch for the handover feature. When false the engine
    /// refuses to initiate transfers and ignores inbound offers; messages
    /// for transfers already in flight are still processed so they can
    /// settle.
    pub enabled: bool,
    /// Lifetime of the recipient's accept/decline prompt.
    pub recipient_accept_timeout: Duration,
    /// How long the recipient waits for the sender's confirm.
    pub recipient_confirm_timeout: Duration,
    /// Extra wait margin for the sender on top of the recipient's accept
    /// window.
    pub sender_offer_wait_extra: Duration,
    /// Lifetime of outcome notices.
    pub notice_duration: Duration,
}

impl TransferConfig {
    /// Total time the sender's wait dialog stays open: the recipient's
    /// whole accept window plus the relay margin.
    pub fn offer_wait_timeout(&self) -> Duration {
        self.recipient_accept_timeout + self.sender_offer_wait_extra
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipient_accept_timeout: RECIPIENT_ACCEPT_TIMEOUT,
            recipient_confirm_timeout: RECIPIENT_CONFIRM_TIMEOUT,
            sender_offer_wait_extra: SENDER_OFFER_WAIT_EXTRA,
            notice_duration: NOTICE_DURATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_wait_covers_accept_window() {
        let config = TransferConfig::default();
        assert_eq!(
            config.offer_wait_timeout(),
            config.recipient_accept_timeout + config.sender_offer_wait_extra
        );
        assert!(config.offer_wait_timeout() > config.recipient_accept_timeout);
    }
}
