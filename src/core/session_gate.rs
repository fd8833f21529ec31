//! SessionGate: shared-password login and profile selection

use chrono::{DateTime, Utc};

use crate::core::{ProfileStore, RewardLedger};
use crate::types::{AlarmSignal, Outcome, ProfileId, ReasonCode, Session};

#[derive(Debug, Default)]
pub struct SessionGate {
    session: Session,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlimited attempts; true iff the password matches the stored secret
    pub fn login(&mut self, store: &ProfileStore, password: &str) -> bool {
        if !store.verify_password(password) {
            tracing::warn!(has_account = store.has_account(), "login refused");
            return false;
        }
        self.session.logged_in = true;
        tracing::info!("logged in");
        true
    }

    /// Log in without a password check, right after registration
    pub(crate) fn login_registered(&mut self) {
        self.session = Session {
            logged_in: true,
            active_profile_id: None,
        };
    }

    /// Switch the active profile.
    ///
    /// A partner who opens the app while the other partner's alarm has been
    /// waiting for more than an hour loses speaking points.
    pub fn select_profile(
        &mut self,
        store: &mut ProfileStore,
        alarm: &AlarmSignal,
        id: &ProfileId,
        now: DateTime<Utc>,
    ) -> Outcome {
        if !self.session.logged_in {
            return Outcome::rejected(ReasonCode::R102_NOT_LOGGED_IN);
        }
        if store.profile(id).is_none() {
            return Outcome::rejected(ReasonCode::R104_UNKNOWN_PROFILE);
        }

        self.session.active_profile_id = Some(id.clone());
        tracing::info!(profile = %id, "profile selected");

        let mut rewards = Vec::new();
        if let Some((sender, triggered_at)) = alarm.pending() {
            if sender != id {
                rewards.extend(RewardLedger::apply_alarm_penalty(store, id, triggered_at, now));
            }
        }
        Outcome::with_rewards(rewards)
    }

    /// Idempotent
    pub fn logout(&mut self) {
        if self.session.logged_in {
            tracing::info!("logged out");
        }
        self.session = Session::default();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Active profile, when logged in
    pub fn active(&self) -> Option<&ProfileId> {
        self.session.active()
    }
}
