//! Read model handed to the UI after every command

use serde::Serialize;

use crate::types::{AlarmSignal, DialoguePhase, DialogueSession, Message, Profile, Session};

/// Everything a screen needs to render, derived from the app state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleView {
    pub has_account: bool,
    pub session: Session,
    pub active_profile: Option<Profile>,
    pub partner_profile: Option<Profile>,
    pub profiles: Vec<Profile>,
    pub alarm: AlarmSignal,
    pub dialogue: DialogueView,
}

/// Dialogue fields without the bookkeeping the UI does not need
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueView {
    #[serde(flatten)]
    pub phase: DialoguePhase,
    pub turn_holder: Option<String>,
    pub step_count: u32,
    pub max_steps: i32,
    pub round: u32,
    pub progress: f64,
    pub restart_pending: bool,
    pub transcript: Vec<Message>,
}

impl DialogueView {
    pub fn new(session: &DialogueSession, restart_pending: bool) -> Self {
        Self {
            phase: session.phase,
            turn_holder: session.turn_holder.as_ref().map(|id| id.to_string()),
            step_count: session.step_count,
            max_steps: session.max_steps,
            round: session.round,
            progress: session.progress(),
            restart_pending,
            transcript: session.transcript.clone(),
        }
    }
}

impl CoupleView {
    /// Display name for a profile id, falling back to the id
    fn name_of(&self, id: &str) -> String {
        self.profiles
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| format!("{} {}", p.avatar, p.name))
            .unwrap_or_else(|| id.to_string())
    }

    /// Multi-line status for the terminal
    pub fn to_terminal_string(&self, no_color: bool) -> String {
        let phase = self.dialogue.phase;
        let color = if no_color { "" } else { phase.color_code() };
        let reset = if no_color { "" } else { DialoguePhase::color_reset() };
        let mut out = String::new();

        if !self.has_account {
            out.push_str("No account - use `register` first\n");
            return out;
        }

        let who = match &self.active_profile {
            Some(p) => format!("{} {}", p.avatar, p.name),
            None if self.session.logged_in => "(no profile selected)".to_string(),
            None => "(logged out)".to_string(),
        };
        out.push_str(&format!("You: {}\n", who));

        for p in &self.profiles {
            out.push_str(&format!(
                "  {} {:<12} speaking={:<3} like={}\n",
                p.avatar, p.name, p.speaking_points, p.like_points
            ));
        }

        if let Some((sender, at)) = self.alarm.pending() {
            out.push_str(&format!(
                "Alarm: raised by {} at {}\n",
                self.name_of(sender.as_str()),
                at.format("%H:%M")
            ));
        }

        out.push_str(&format!(
            "{}{} Road of Peace: {} | step {}/{} | round {}{}\n",
            color,
            phase.emoji(),
            phase,
            self.dialogue.step_count,
            self.dialogue.max_steps,
            self.dialogue.round + 1,
            reset
        ));

        if let Some(turn) = &self.dialogue.turn_holder {
            if phase.is_active() {
                out.push_str(&format!("  Turn: {}\n", self.name_of(turn)));
            }
        }
        if self.dialogue.restart_pending {
            out.push_str("  Round complete - starting over...\n");
        }

        for msg in &self.dialogue.transcript {
            let marker = if msg.is_apology { "🙏" } else { "💬" };
            out.push_str(&format!(
                "  {} [{}] {}: {}",
                marker,
                msg.timestamp.format("%H:%M"),
                self.name_of(msg.author.as_str()),
                msg.content
            ));
            if let Some(reason) = msg.apology_reason.as_deref().filter(|r| !r.is_empty()) {
                out.push_str(&format!(" (sorry for: {})", reason));
            }
            out.push('\n');
        }

        out
    }
}
