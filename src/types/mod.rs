//! Core types for peacetalk

mod dialogue;
mod output;
mod profile;
mod reason;
mod session;
mod state;
mod view;

pub use dialogue::{DialogueId, DialogueSession, Message, RestartTicket};
pub use output::{Outcome, PointChange};
pub use profile::{CoupleAccount, PointField, Profile, ProfileId, ProfileInput, SharedSecret};
pub use reason::ReasonCode;
pub use session::{AlarmSignal, Session};
pub use state::DialoguePhase;
pub use view::{CoupleView, DialogueView};
