use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// What tripped the cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// A first-match run found its success.
    MatchFound,
    /// External interrupt (Ctrl-C or caller request).
    Interrupted,
    /// The overall run deadline elapsed.
    DeadlineExceeded,
}

/// Single shared cancellation signal for one run.
///
/// Cloned freely; all clones observe the same token and reason. `trip` is
/// idempotent: the first reason wins, later trips are no-ops. Probes and the
/// scheduler observe it through `token()` / `is_cancelled()`.
#[derive(Clone)]
pub struct CancelController {
    token: CancellationToken,
    reason: Arc<Mutex<Option<CancelReason>>>,
}

impl CancelController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    /// Flip the signal. Only the first call records its reason.
    pub fn trip(&self, reason: CancelReason) {
        let mut slot = self.reason.lock();
        if slot.is_none() {
            *slot = Some(reason);
            drop(slot);
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        *self.reason.lock()
    }

    /// Token handle for cooperative checkpoints inside probes and for the
    /// scheduler's candidate pull.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for CancelController {
    fn default() -> Self {
        Self::new()
    }
}
