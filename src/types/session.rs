//! Login session and alarm signal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProfileId;

/// Who is at the device right now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
    /// Only meaningful while `logged_in`
    pub active_profile_id: Option<ProfileId>,
}

impl Session {
    /// Active profile, if logged in and one is selected
    pub fn active(&self) -> Option<&ProfileId> {
        if self.logged_in {
            self.active_profile_id.as_ref()
        } else {
            None
        }
    }
}

/// One partner asking the other for urgent attention.
///
/// `active` implies `sender_id` and `triggered_at` are both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSignal {
    pub active: bool,
    pub sender_id: Option<ProfileId>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl AlarmSignal {
    /// A raised alarm
    pub fn raised(sender: ProfileId, at: DateTime<Utc>) -> Self {
        Self {
            active: true,
            sender_id: Some(sender),
            triggered_at: Some(at),
        }
    }

    /// Sender and time of an active alarm
    pub fn pending(&self) -> Option<(&ProfileId, DateTime<Utc>)> {
        if !self.active {
            return None;
        }
        match (&self.sender_id, self.triggered_at) {
            (Some(sender), Some(at)) => Some((sender, at)),
            _ => None,
        }
    }
}
