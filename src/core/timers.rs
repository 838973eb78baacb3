//! Timeout scheduling for the confirm wait.
//!
//! The recipient arms one timer per accepted transfer while waiting for
//! the sender's confirm. The handle is owned by the transfer record and
//! canceled exactly once during cleanup; a timer that fires after its
//! record moved on is absorbed by the engine's state guard.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::core::item::ItemId;

/// A cancelable pending timeout.
pub trait TimerHandle: Send {
    /// Cancel the timeout if it has not fired yet. Idempotent.
    fn cancel(&mut self);
}

/// Arms delayed callbacks for the engine.
///
/// Contract: when a timer armed for `item_id` fires, the host delivers
/// `ItemTransferEngine::confirm_wait_timed_out(item_id)` from the event
/// loop owning the engine, unless the handle was canceled first.
pub trait TimerHost: Send + Sync {
    fn arm(&self, item_id: ItemId, after: Duration) -> Box<dyn TimerHandle>;
}

// ── Tokio-backed implementation ──────────────────────────────────────────────

/// Timer host backed by the tokio runtime.
///
/// Each armed timer is a spawned task that sleeps and then pushes the
/// item id onto a channel. The embedding event loop drains the channel
/// and calls `confirm_wait_timed_out` for each id, keeping all engine
/// access on the one task that owns it.
pub struct TokioTimers {
    fired: mpsc::UnboundedSender<ItemId>,
}

impl TokioTimers {
    /// Create a host delivering expirations through `fired`.
    pub fn new(fired: mpsc::UnboundedSender<ItemId>) -> Self {
        Self { fired }
    }
}

impl TimerHost for TokioTimers {
    fn arm(&self, item_id: ItemId, after: Duration) -> Box<dyn TimerHandle> {
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = fired.send(item_id);
        });
        Box::new(TokioTimerHandle {
            abort: task.abort_handle(),
        })
    }
}

struct TokioTimerHandle {
    abort: AbortHandle,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.abort.abort();
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        // A dropped handle means its record is gone; the timeout must not
        // outlive it.
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_armed_timer_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = TokioTimers::new(tx);
        let _handle = timers.arm("item-1".to_string(), Duration::from_millis(5));
        let fired = rx.recv().await;
        assert_eq!(fired.as_deref(), Some("item-1"));
    }

    #[tokio::test]
    async fn test_canceled_timer_stays_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = TokioTimers::new(tx);
        let mut handle = timers.arm("item-2".to_string(), Duration::from_millis(20));
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }
}
