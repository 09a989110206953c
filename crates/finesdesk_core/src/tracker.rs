//! Request sequencing and lifecycle cancellation.
//!
//! Each fetch or submit takes a [`RequestTicket`]. A result is applied only if
//! its ticket is still the newest one issued by the tracker and the tracker
//! has not been cancelled, so late responses for superseded queries and
//! responses arriving after a view or modal went away are dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct TrackerState {
    latest: AtomicU64,
    cancelled: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    state: Arc<TrackerState>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request; any earlier ticket becomes stale.
    pub fn issue(&self) -> RequestTicket {
        let seq = self.state.latest.fetch_add(1, Ordering::AcqRel) + 1;
        RequestTicket {
            seq,
            state: Arc::clone(&self.state),
        }
    }

    /// Invalidate every outstanding and future ticket.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }
}

/// Sequence stamp for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    seq: u64,
    state: Arc<TrackerState>,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether this ticket's result may still be applied.
    pub fn is_current(&self) -> bool {
        !self.state.cancelled.load(Ordering::Acquire)
            && self.state.latest.load(Ordering::Acquire) == self.seq
    }
}
