// src/notice.rs
use std::time::Duration;

use tokio::time::Instant;

/// Display timer for the single error message slot.
/// - Arming returns a ticket that names the expiry instant.
/// - Re-arming or disarming invalidates every earlier ticket, so a stale timer
///   can never clear a newer error.
#[derive(Debug, Clone)]
pub struct NoticeTimer {
    display: Duration,
    epoch: u64,
}

/// Handle for one armed error display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTicket {
    pub epoch: u64,
    pub expires_at: Instant,
}

impl NoticeTimer {
    pub fn new(display: Duration) -> Self {
        Self { display, epoch: 0 }
    }

    /// Start showing a new error at `now`.
    pub fn arm(&mut self, now: Instant) -> NoticeTicket {
        self.epoch = self.epoch.wrapping_add(1);
        NoticeTicket {
            epoch: self.epoch,
            expires_at: now + self.display,
        }
    }

    /// The slot was taken over by something else (new submission, success).
    pub fn disarm(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn is_current(&self, ticket: &NoticeTicket) -> bool {
        self.epoch == ticket.epoch
    }
}

pub fn is_expired(expires_at: Instant, now: Instant) -> bool {
    now >= expires_at
}
