use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

/// Counts tasks that were accepted but not yet handled.
#[derive(Debug, Default)]
pub(super) struct InFlight {
    counter: AtomicU64,
    idle: Notify,
}

impl InFlight {
    pub(super) fn add(&self) {
        self.counter.fetch_add(1, Ordering::AcqRel);
    }

    pub(super) fn done(&self) {
        loop {
            let current = self.counter.load(Ordering::Acquire);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .counter
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                if next == 0 {
                    self.idle.notify_waiters();
                }
                break;
            }
        }
    }

    pub(super) fn pending(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    pub(super) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
