//! Road of Peace dialogue phases

use serde::{Deserialize, Serialize};

/// Lifecycle of a Road of Peace dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialoguePhase {
    /// No dialogue has been started
    #[default]
    Idle,
    /// Partners are taking turns
    Active,
    /// Ended by one of the partners
    Concluded { resolved: bool },
}

impl DialoguePhase {
    pub fn is_active(&self) -> bool {
        matches!(self, DialoguePhase::Active)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            DialoguePhase::Idle => "\x1b[90m",                          // Gray
            DialoguePhase::Active => "\x1b[33m",                        // Yellow
            DialoguePhase::Concluded { resolved: true } => "\x1b[32m",  // Green
            DialoguePhase::Concluded { resolved: false } => "\x1b[31m", // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            DialoguePhase::Idle => "⏳",
            DialoguePhase::Active => "🕊",
            DialoguePhase::Concluded { resolved: true } => "💞",
            DialoguePhase::Concluded { resolved: false } => "💔",
        }
    }
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialoguePhase::Idle => "IDLE",
            DialoguePhase::Active => "ACTIVE",
            DialoguePhase::Concluded { resolved: true } => "RESOLVED",
            DialoguePhase::Concluded { resolved: false } => "UNRESOLVED",
        };
        write!(f, "{}", name)
    }
}
