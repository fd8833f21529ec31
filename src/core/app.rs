//! CoupleApp: the single application-state value
//!
//! Every UI command enters here. The app routes it to the component that owns
//! the state, reads the time from its [`Clock`] once per command, and runs any
//! restart that fell due before the command itself.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::{
    AlarmState, Clock, ConflictDialogue, KeyValueStore, ProfileStore, ScheduledRestart,
    SessionGate, SystemClock,
};
use crate::error::{CoupleError, ValidationError};
use crate::types::{
    AlarmSignal, CoupleAccount, CoupleView, DialogueSession, DialogueView, Message, Outcome,
    Profile, ProfileId, ProfileInput, ReasonCode, RestartTicket, Session,
};
use crate::AUTO_RESTART_DELAY_MS;

/// Runtime settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    /// Pause between a full round and its restart
    pub restart_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            restart_delay: Duration::milliseconds(AUTO_RESTART_DELAY_MS as i64),
        }
    }
}

impl CoreConfig {
    pub fn with_restart_delay_ms(ms: u64) -> Self {
        Self {
            restart_delay: Duration::milliseconds(ms.min(i64::MAX as u64) as i64),
        }
    }
}

pub struct CoupleApp {
    store: ProfileStore,
    gate: SessionGate,
    alarm: AlarmState,
    dialogue: ConflictDialogue,
    clock: Arc<dyn Clock>,
    config: CoreConfig,
}

impl std::fmt::Debug for CoupleApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoupleApp")
            .field("store", &self.store)
            .field("gate", &self.gate)
            .field("alarm", &self.alarm)
            .field("dialogue", &self.dialogue)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CoupleApp {
    pub fn new(backend: impl KeyValueStore + 'static, clock: Arc<dyn Clock>, config: CoreConfig) -> Self {
        Self {
            store: ProfileStore::open(backend),
            gate: SessionGate::new(),
            alarm: AlarmState::new(),
            dialogue: ConflictDialogue::with_restart_delay(config.restart_delay),
            clock,
            config,
        }
    }

    /// App on the real clock with default settings
    pub fn with_backend(backend: impl KeyValueStore + 'static) -> Self {
        Self::new(backend, Arc::new(SystemClock), CoreConfig::default())
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Register from a signup form: the password is typed twice
    pub fn register(
        &mut self,
        password: &str,
        confirmation: &str,
        profiles: &[ProfileInput],
    ) -> Result<(), CoupleError> {
        if password != confirmation {
            return Err(ValidationError::PasswordMismatch.into());
        }
        self.create_account(password, profiles)
    }

    /// Create the couple account and log straight in
    pub fn create_account(&mut self, password: &str, profiles: &[ProfileInput]) -> Result<(), CoupleError> {
        self.poll();
        let now = self.clock.now();
        self.store.create(password, profiles, now)?;
        self.gate.login_registered();
        self.alarm.clear();
        self.dialogue.reset();
        Ok(())
    }

    pub fn login(&mut self, password: &str) -> bool {
        self.poll();
        self.gate.login(&self.store, password)
    }

    pub fn select_profile(&mut self, id: &ProfileId) -> Outcome {
        self.poll();
        let now = self.clock.now();
        let outcome = self
            .gate
            .select_profile(&mut self.store, self.alarm.signal(), id, now);
        report("select_profile", outcome)
    }

    pub fn trigger_alarm(&mut self) -> Outcome {
        self.poll();
        let now = self.clock.now();
        let outcome = match self.actor() {
            Ok(sender) => self.alarm.trigger(&sender, now),
            Err(reason) => Outcome::rejected(reason),
        };
        report("trigger_alarm", outcome)
    }

    pub fn acknowledge_alarm(&mut self) -> Outcome {
        self.poll();
        let outcome = match self.actor() {
            Ok(by) => self.alarm.acknowledge(&by),
            Err(reason) => Outcome::rejected(reason),
        };
        report("acknowledge_alarm", outcome)
    }

    /// Open the Road of Peace. The alarm sender speaks first; without an
    /// alarm the active profile does.
    pub fn start_dialogue(&mut self, requested_steps: i32) -> Outcome {
        self.poll();
        let outcome = match self.actor() {
            Ok(active) => {
                let opener = self.alarm.sender().cloned().unwrap_or(active);
                self.dialogue.start(requested_steps, &opener)
            }
            Err(reason) => Outcome::rejected(reason),
        };
        report("start_dialogue", outcome)
    }

    /// Post as the active profile
    pub fn post_message(&mut self, content: &str, is_apology: bool, apology_reason: Option<&str>) -> Outcome {
        self.poll();
        let now = self.clock.now();
        let outcome = match self.actor() {
            Ok(author) => self.dialogue.post_message(
                &mut self.store,
                &author,
                content,
                is_apology,
                apology_reason,
                now,
            ),
            Err(reason) => Outcome::rejected(reason),
        };
        report("post_message", outcome)
    }

    pub fn conclude(&mut self, resolved: bool) -> Outcome {
        self.poll();
        let now = self.clock.now();
        let outcome = match self.actor() {
            Ok(_) => self
                .dialogue
                .conclude(&mut self.store, &mut self.alarm, resolved, now),
            Err(reason) => Outcome::rejected(reason),
        };
        report("conclude", outcome)
    }

    /// Leave the device: session, alarm and dialogue all reset. Idempotent.
    pub fn logout(&mut self) {
        self.gate.logout();
        self.alarm.clear();
        self.dialogue.reset();
    }

    /// Run a restart whose delay has passed
    pub fn poll(&mut self) -> Option<RestartTicket> {
        let now = self.clock.now();
        self.dialogue.fire_due(now)
    }

    /// Run the restart for `ticket` now. Stale tickets are rejected.
    pub fn fire_restart(&mut self, ticket: RestartTicket) -> Outcome {
        self.dialogue.fire(ticket)
    }

    /// The active profile id, or why there is none
    fn actor(&self) -> Result<ProfileId, ReasonCode> {
        if !self.store.has_account() {
            return Err(ReasonCode::R101_NO_ACCOUNT);
        }
        if !self.gate.session().logged_in {
            return Err(ReasonCode::R102_NOT_LOGGED_IN);
        }
        self.gate
            .active()
            .cloned()
            .ok_or(ReasonCode::R103_NO_ACTIVE_PROFILE)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn session(&self) -> &Session {
        self.gate.session()
    }

    pub fn account(&self) -> Option<&CoupleAccount> {
        self.store.account()
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.gate.active().and_then(|id| self.store.profile(id))
    }

    pub fn partner_profile(&self) -> Option<&Profile> {
        self.gate.active().and_then(|id| self.store.partner_of(id))
    }

    pub fn alarm(&self) -> &AlarmSignal {
        self.alarm.signal()
    }

    pub fn dialogue(&self) -> &DialogueSession {
        self.dialogue.session()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.dialogue.session().transcript
    }

    pub fn progress(&self) -> f64 {
        self.dialogue.session().progress()
    }

    pub fn pending_restart(&self) -> Option<&ScheduledRestart> {
        self.dialogue.pending_restart()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Snapshot for rendering
    pub fn view(&self) -> CoupleView {
        CoupleView {
            has_account: self.store.has_account(),
            session: self.gate.session().clone(),
            active_profile: self.active_profile().cloned(),
            partner_profile: self.partner_profile().cloned(),
            profiles: self
                .store
                .account()
                .map(|a| a.profiles.clone())
                .unwrap_or_default(),
            alarm: self.alarm.signal().clone(),
            dialogue: DialogueView::new(self.dialogue.session(), self.pending_restart().is_some()),
        }
    }
}

fn report(command: &'static str, outcome: Outcome) -> Outcome {
    if let Some(reason) = outcome.reason() {
        tracing::warn!(command, reason = reason.code(), "command rejected");
    }
    outcome
}

// =============================================================================
// TESTS
// =============================================================================
