//! Command outcomes

use serde::{Deserialize, Serialize};

use crate::types::{PointField, ProfileId, ReasonCode};

/// A point change applied to one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointChange {
    pub profile: ProfileId,
    pub field: PointField,
    /// Delta the rule asked for
    pub requested: i64,
    /// Delta actually applied after clamping
    pub applied: i64,
    /// Balance after the change
    pub balance: i64,
}

impl PointChange {
    /// Format for terminal display
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{} {:+} {} points (now {})",
            self.profile, self.applied, self.field, self.balance
        )
    }
}

/// Result of every state-changing command.
///
/// Commands that do not apply never fail: they come back `Rejected` and leave
/// the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted { rewards: Vec<PointChange> },
    Rejected { reason: ReasonCode },
}

impl Outcome {
    pub fn accepted() -> Self {
        Outcome::Accepted { rewards: Vec::new() }
    }

    pub fn with_rewards(rewards: Vec<PointChange>) -> Self {
        Outcome::Accepted { rewards }
    }

    pub fn rejected(reason: ReasonCode) -> Self {
        Outcome::Rejected { reason }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Outcome::Rejected { reason } => Some(*reason),
            Outcome::Accepted { .. } => None,
        }
    }

    pub fn rewards(&self) -> &[PointChange] {
        match self {
            Outcome::Accepted { rewards } => rewards,
            Outcome::Rejected { .. } => &[],
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        match self {
            Outcome::Accepted { rewards } if rewards.is_empty() => "\x1b[32m✓ ok\x1b[0m".to_string(),
            Outcome::Accepted { rewards } => {
                let lines: Vec<String> = rewards
                    .iter()
                    .map(|r| format!("  ★ {}", r.to_terminal_string()))
                    .collect();
                format!("\x1b[32m✓ ok\n{}\x1b[0m", lines.join("\n"))
            }
            Outcome::Rejected { reason } => format!("\x1b[33m✗ {}\x1b[0m", reason.description()),
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        match self {
            Outcome::Accepted { rewards } => {
                let mut out = "status=accepted".to_string();
                for r in rewards {
                    out.push_str(&format!(" | {}:{}={:+}", r.profile, r.field, r.applied));
                }
                out
            }
            Outcome::Rejected { reason } => format!("status=rejected | reason={}", reason.code()),
        }
    }
}
