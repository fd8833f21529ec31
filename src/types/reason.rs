//! Reason codes for rejected commands
//!
//! Grouped by the component that refuses the command.

use serde::{Deserialize, Serialize};

/// Why a command left the state unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R1xx: Session gate
    // =========================================================================
    /// No couple account has been registered yet
    R101_NO_ACCOUNT,
    /// Command requires a logged-in session
    R102_NOT_LOGGED_IN,
    /// Command requires a selected profile
    R103_NO_ACTIVE_PROFILE,
    /// Profile id does not belong to this couple
    R104_UNKNOWN_PROFILE,

    // =========================================================================
    // R2xx: Alarm
    // =========================================================================
    /// No alarm is currently raised
    R201_ALARM_NOT_ACTIVE,
    /// The sender cannot acknowledge their own alarm
    R202_OWN_ALARM,

    // =========================================================================
    // R3xx: Road of Peace
    // =========================================================================
    /// A dialogue is already running
    R301_DIALOGUE_ALREADY_ACTIVE,
    /// No dialogue is running
    R302_DIALOGUE_NOT_ACTIVE,
    /// It is the partner's turn
    R303_NOT_YOUR_TURN,
    /// Round is full and about to start over
    R304_RESTART_PENDING,
    /// Message has no content
    R305_EMPTY_MESSAGE,
    /// Restart ticket no longer matches the running round
    R306_STALE_RESTART,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_NO_ACCOUNT => "R101_NO_ACCOUNT",
            Self::R102_NOT_LOGGED_IN => "R102_NOT_LOGGED_IN",
            Self::R103_NO_ACTIVE_PROFILE => "R103_NO_ACTIVE_PROFILE",
            Self::R104_UNKNOWN_PROFILE => "R104_UNKNOWN_PROFILE",
            Self::R201_ALARM_NOT_ACTIVE => "R201_ALARM_NOT_ACTIVE",
            Self::R202_OWN_ALARM => "R202_OWN_ALARM",
            Self::R301_DIALOGUE_ALREADY_ACTIVE => "R301_DIALOGUE_ALREADY_ACTIVE",
            Self::R302_DIALOGUE_NOT_ACTIVE => "R302_DIALOGUE_NOT_ACTIVE",
            Self::R303_NOT_YOUR_TURN => "R303_NOT_YOUR_TURN",
            Self::R304_RESTART_PENDING => "R304_RESTART_PENDING",
            Self::R305_EMPTY_MESSAGE => "R305_EMPTY_MESSAGE",
            Self::R306_STALE_RESTART => "R306_STALE_RESTART",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_NO_ACCOUNT => "No couple account yet - register first",
            Self::R102_NOT_LOGGED_IN => "Log in first",
            Self::R103_NO_ACTIVE_PROFILE => "Select your profile first",
            Self::R104_UNKNOWN_PROFILE => "No such profile",
            Self::R201_ALARM_NOT_ACTIVE => "No alarm is raised",
            Self::R202_OWN_ALARM => "You raised this alarm yourself",
            Self::R301_DIALOGUE_ALREADY_ACTIVE => "The Road of Peace is already open",
            Self::R302_DIALOGUE_NOT_ACTIVE => "The Road of Peace is not open",
            Self::R303_NOT_YOUR_TURN => "Wait for your partner",
            Self::R304_RESTART_PENDING => "Round complete - starting over",
            Self::R305_EMPTY_MESSAGE => "Write something first",
            Self::R306_STALE_RESTART => "Restart no longer applies",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
