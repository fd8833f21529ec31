//! Core modules for peacetalk

pub mod alarm;
pub mod api;
pub mod app;
pub mod clock;
pub mod dialogue;
pub mod profile_store;
pub mod rewards;
pub mod scheduler;
pub mod secret;
pub mod session_gate;
pub mod store;

pub use alarm::AlarmState;
pub use api::{create_router, run_server};
pub use app::{CoreConfig, CoupleApp};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dialogue::ConflictDialogue;
pub use profile_store::ProfileStore;
pub use rewards::RewardLedger;
pub use scheduler::{RestartScheduler, ScheduledRestart};
pub use session_gate::SessionGate;
pub use store::{FileStore, KeyValueStore, MemoryStore};
