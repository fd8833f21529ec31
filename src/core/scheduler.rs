//! Deferred auto-restart of a full dialogue round
//!
//! At most one restart is pending. It is keyed by [`RestartTicket`], so a
//! timer that fires after its dialogue was concluded, restarted or replaced
//! finds a different (or no) entry and does nothing.

use chrono::{DateTime, Duration, Utc};

use crate::types::RestartTicket;

/// A restart waiting for its delay to pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRestart {
    pub ticket: RestartTicket,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RestartScheduler {
    pending: Option<ScheduledRestart>,
}

impl RestartScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a restart, replacing any earlier one. A delay past the end of
    /// representable time saturates.
    pub fn schedule(&mut self, ticket: RestartTicket, now: DateTime<Utc>, delay: Duration) -> ScheduledRestart {
        let entry = ScheduledRestart {
            ticket,
            due_at: now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        tracing::debug!(dialogue = %ticket.dialogue, round = ticket.round, "restart scheduled");
        self.pending = Some(entry);
        entry
    }

    /// Drop the pending restart, if any
    pub fn cancel(&mut self) -> Option<ScheduledRestart> {
        let cancelled = self.pending.take();
        if let Some(entry) = &cancelled {
            tracing::debug!(dialogue = %entry.ticket.dialogue, round = entry.ticket.round, "restart cancelled");
        }
        cancelled
    }

    /// Take the pending restart if its delay has passed
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<RestartTicket> {
        match self.pending {
            Some(entry) if entry.due_at <= now => {
                self.pending = None;
                Some(entry.ticket)
            }
            _ => None,
        }
    }

    /// Take the pending restart if it matches `ticket`, regardless of time
    pub fn take_matching(&mut self, ticket: RestartTicket) -> bool {
        if self.pending.map(|e| e.ticket) == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> Option<&ScheduledRestart> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
