//! AlarmState: one partner asking the other for urgent attention

use chrono::{DateTime, Utc};

use crate::types::{AlarmSignal, Outcome, ProfileId, ReasonCode};

#[derive(Debug, Default)]
pub struct AlarmState {
    signal: AlarmSignal,
}

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the alarm. Raising again just moves sender and time.
    pub fn trigger(&mut self, sender: &ProfileId, now: DateTime<Utc>) -> Outcome {
        self.signal = AlarmSignal::raised(sender.clone(), now);
        tracing::info!(sender = %sender, "alarm raised");
        Outcome::accepted()
    }

    /// The recipient has seen the alarm. The alarm itself stays raised until
    /// the dialogue it leads to concludes.
    pub fn acknowledge(&self, by: &ProfileId) -> Outcome {
        match self.signal.pending() {
            None => Outcome::rejected(ReasonCode::R201_ALARM_NOT_ACTIVE),
            Some((sender, _)) if sender == by => Outcome::rejected(ReasonCode::R202_OWN_ALARM),
            Some(_) => {
                tracing::info!(by = %by, "alarm acknowledged");
                Outcome::accepted()
            }
        }
    }

    pub fn clear(&mut self) {
        if self.signal.active {
            tracing::info!("alarm cleared");
        }
        self.signal = AlarmSignal::default();
    }

    pub fn signal(&self) -> &AlarmSignal {
        &self.signal
    }

    pub fn sender(&self) -> Option<&ProfileId> {
        self.signal.pending().map(|(sender, _)| sender)
    }
}
