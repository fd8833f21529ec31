//! Road of Peace transcript model
//!
//! - Message = one partner's contribution, append-only
//! - Round = one pass from step 0 up to `max_steps`
//! - Dialogue = rounds between `start` and `conclude`, sharing one id

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DialoguePhase, ProfileId};

/// Identity of one started dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueId(pub u64);

impl fmt::Display for DialogueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialogue-{}", self.0)
    }
}

/// Key of a scheduled auto-restart: valid only for one round of one dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestartTicket {
    pub dialogue: DialogueId,
    pub round: u32,
}

/// A single message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub author: ProfileId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_apology: bool,
    /// Present iff `is_apology`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apology_reason: Option<String>,
}

impl Message {
    /// Plain message
    pub fn new(author: ProfileId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content: content.into(),
            timestamp,
            is_apology: false,
            apology_reason: None,
        }
    }

    /// Apology; the reason is kept even when empty
    pub fn apology(
        author: ProfileId,
        content: impl Into<String>,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            is_apology: true,
            apology_reason: Some(reason.into()),
            ..Self::new(author, content, timestamp)
        }
    }
}

/// State of the Road of Peace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueSession {
    pub id: Option<DialogueId>,
    #[serde(flatten)]
    pub phase: DialoguePhase,
    pub turn_holder: Option<ProfileId>,
    /// Who spoke first; the turn returns here on every restart
    pub opener: Option<ProfileId>,
    pub step_count: u32,
    pub max_steps: i32,
    /// Auto-restarts so far in this dialogue
    pub round: u32,
    pub transcript: Vec<Message>,
    /// Partners who already apologised in this dialogue
    pub apologised: BTreeSet<ProfileId>,
}

impl DialogueSession {
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Has this round used up its steps?
    pub fn is_full(&self) -> bool {
        i64::from(self.step_count) >= i64::from(self.max_steps)
    }

    /// Timestamp of the first message in the current round
    pub fn first_message_at(&self) -> Option<DateTime<Utc>> {
        self.transcript.first().map(|m| m.timestamp)
    }

    /// Ticket for a restart of the current round
    pub fn ticket(&self) -> Option<RestartTicket> {
        self.id.map(|dialogue| RestartTicket {
            dialogue,
            round: self.round,
        })
    }

    /// Progress through the round as a fraction in 0.0..=1.0
    pub fn progress(&self) -> f64 {
        if self.max_steps <= 0 {
            return if self.step_count > 0 { 1.0 } else { 0.0 };
        }
        (f64::from(self.step_count) / f64::from(self.max_steps)).min(1.0)
    }
}
