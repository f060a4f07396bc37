use std::time::Duration;
use tether_core::session::SessionEvent;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Owned, cancellable handle for the single scheduled token refresh.
///
/// Every schedule and every cancel bumps the generation, so a tick that was
/// already queued when its timer was replaced is recognised as stale.
#[derive(Debug, Default)]
pub struct RefreshTimer {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any pending refresh with one firing after `delay`.
    ///
    /// Returns the generation the tick will carry.
    pub fn schedule(&mut self, delay: Duration, tx: UnboundedSender<SessionEvent>) -> u64 {
        self.cancel();
        let generation = self.generation;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::RefreshDue { generation });
        }));
        generation
    }

    /// Cancels the pending refresh, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Consumes a tick. Returns false for ticks of replaced or cancelled timers.
    pub fn fire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        self.generation += 1;
        true
    }

    /// True while a scheduled refresh has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
