// ── Trailing-edge debounce ──────────────────────────────────────────────

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

const LOCK_POISONED: &str = "debouncer lock poisoned";

/// Runs a callback after a quiet period, keeping only the latest request.
///
/// Scheduling again before the delay elapses cancels the pending callback,
/// so a burst of calls fires exactly once, with the last callback. Each
/// debouncer is its own slot; independent concerns never cancel each
/// other. Dropping the debouncer cancels whatever is pending.
#[derive(Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` to run after `delay`, cancelling any pending
    /// callback first. Must be called within a Tokio runtime.
    pub fn delay(&self, delay: Duration, callback: impl FnOnce() + Send + 'static) {
        let mut pending = self.pending.lock().expect(LOCK_POISONED);
        // Abort before spawning the replacement, so an elapsed timer
        // cannot fire between the two.
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Drop the pending callback, if any, without running it.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().expect(LOCK_POISONED).take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }
}
