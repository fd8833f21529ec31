//! ConflictDialogue: the Road of Peace turn engine
//!
//! Phase transitions:
//! - IDLE/CONCLUDED → ACTIVE: start (turn goes to the alarm sender)
//! - ACTIVE → ACTIVE: accepted message flips the turn
//! - ACTIVE (round full) → ACTIVE: auto-restart after a delay, same dialogue id
//! - ACTIVE → CONCLUDED: conclude (clears the alarm)

use chrono::{DateTime, Duration, Utc};

use crate::core::{AlarmState, ProfileStore, RestartScheduler, RewardLedger, ScheduledRestart};
use crate::types::{
    DialogueId, DialoguePhase, DialogueSession, Message, Outcome, ProfileId, ReasonCode,
    RestartTicket,
};
use crate::{AUTO_RESTART_DELAY_MS, MAX_DIALOGUE_STEPS};

/// Road of Peace state machine
#[derive(Debug)]
pub struct ConflictDialogue {
    session: DialogueSession,
    restarts: RestartScheduler,
    restart_delay: Duration,
    next_id: u64,
}

impl Default for ConflictDialogue {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictDialogue {
    /// Create engine with the default restart delay (1s)
    pub fn new() -> Self {
        Self::with_restart_delay(Duration::milliseconds(AUTO_RESTART_DELAY_MS as i64))
    }

    pub fn with_restart_delay(restart_delay: Duration) -> Self {
        Self {
            session: DialogueSession::default(),
            restarts: RestartScheduler::new(),
            restart_delay,
            next_id: 1,
        }
    }

    /// Open the Road of Peace with `opener` speaking first.
    ///
    /// `max_steps` is `min(requested_steps, 20)`.
    pub fn start(&mut self, requested_steps: i32, opener: &ProfileId) -> Outcome {
        if self.session.is_active() {
            return Outcome::rejected(ReasonCode::R301_DIALOGUE_ALREADY_ACTIVE);
        }
        self.restarts.cancel();

        let id = DialogueId(self.next_id);
        self.next_id += 1;

        self.session = DialogueSession {
            id: Some(id),
            phase: DialoguePhase::Active,
            turn_holder: Some(opener.clone()),
            opener: Some(opener.clone()),
            step_count: 0,
            max_steps: requested_steps.min(MAX_DIALOGUE_STEPS),
            round: 0,
            transcript: Vec::new(),
            apologised: Default::default(),
        };
        tracing::info!(
            dialogue = %id,
            opener = %opener,
            max_steps = self.session.max_steps,
            "road of peace started"
        );
        Outcome::accepted()
    }

    /// Add `author`'s message and hand the turn to their partner.
    ///
    /// The first apology a partner makes in this dialogue earns like points.
    /// Filling the round schedules a restart.
    pub fn post_message(
        &mut self,
        store: &mut ProfileStore,
        author: &ProfileId,
        content: &str,
        is_apology: bool,
        apology_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Outcome {
        if !self.session.is_active() {
            return Outcome::rejected(ReasonCode::R302_DIALOGUE_NOT_ACTIVE);
        }
        if self.restarts.is_pending() {
            return Outcome::rejected(ReasonCode::R304_RESTART_PENDING);
        }
        if self.session.turn_holder.as_ref() != Some(author) {
            return Outcome::rejected(ReasonCode::R303_NOT_YOUR_TURN);
        }
        if content.trim().is_empty() {
            return Outcome::rejected(ReasonCode::R305_EMPTY_MESSAGE);
        }
        let Some(partner) = store.partner_of(author).map(|p| p.id.clone()) else {
            return Outcome::rejected(ReasonCode::R104_UNKNOWN_PROFILE);
        };

        let message = if is_apology {
            Message::apology(author.clone(), content, apology_reason.unwrap_or_default(), now)
        } else {
            Message::new(author.clone(), content, now)
        };
        self.session.transcript.push(message);
        self.session.step_count += 1;
        self.session.turn_holder = Some(partner);

        let mut rewards = Vec::new();
        if is_apology {
            let already = !self.session.apologised.insert(author.clone());
            rewards.extend(RewardLedger::apply_apology_bonus(store, author, already));
        }

        tracing::debug!(
            author = %author,
            step = self.session.step_count,
            max_steps = self.session.max_steps,
            is_apology,
            "message posted"
        );

        if self.session.is_full() {
            if let Some(ticket) = self.session.ticket() {
                self.restarts.schedule(ticket, now, self.restart_delay);
            }
        }

        Outcome::with_rewards(rewards)
    }

    /// End the dialogue and clear the alarm. Resolving within 30 minutes of
    /// the first message rewards both partners.
    pub fn conclude(
        &mut self,
        store: &mut ProfileStore,
        alarm: &mut AlarmState,
        resolved: bool,
        now: DateTime<Utc>,
    ) -> Outcome {
        if !self.session.is_active() {
            return Outcome::rejected(ReasonCode::R302_DIALOGUE_NOT_ACTIVE);
        }
        self.restarts.cancel();

        // The window counts from the first message of the current round, while
        // the apology set spans every round of the dialogue. Keep them apart.
        let rewards = RewardLedger::apply_resolution_bonus(
            store,
            resolved,
            self.session.first_message_at(),
            now,
        );

        self.session.phase = DialoguePhase::Concluded { resolved };
        self.session.turn_holder = None;
        alarm.clear();

        tracing::info!(
            dialogue = ?self.session.id,
            resolved,
            messages = self.session.transcript.len(),
            "road of peace concluded"
        );
        Outcome::with_rewards(rewards)
    }

    /// Run the pending restart if its delay has passed
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Option<RestartTicket> {
        let ticket = self.restarts.take_due(now)?;
        self.restart_round(ticket);
        Some(ticket)
    }

    /// Run the restart for `ticket` now, if it is still the pending one
    pub fn fire(&mut self, ticket: RestartTicket) -> Outcome {
        if !self.restarts.take_matching(ticket) {
            return Outcome::rejected(ReasonCode::R306_STALE_RESTART);
        }
        self.restart_round(ticket);
        Outcome::accepted()
    }

    fn restart_round(&mut self, ticket: RestartTicket) {
        self.session.transcript.clear();
        self.session.step_count = 0;
        self.session.round += 1;
        self.session.turn_holder = self.session.opener.clone();
        tracing::info!(dialogue = %ticket.dialogue, round = self.session.round, "road of peace restarted");
    }

    /// Drop the dialogue entirely (logout)
    pub fn reset(&mut self) {
        self.restarts.cancel();
        self.session = DialogueSession::default();
    }

    pub fn session(&self) -> &DialogueSession {
        &self.session
    }

    pub fn pending_restart(&self) -> Option<&ScheduledRestart> {
        self.restarts.pending()
    }
}

// =============================================================================
// TESTS
// =============================================================================
