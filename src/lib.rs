//! peacetalk: shared-account core for a couples communication companion
//!
//! Two partners share one account, raise alarms when one of them needs the
//! other's attention, and talk things through on the "Road of Peace", a
//! strictly alternating dialogue. Constructive behavior earns like points;
//! ignoring an alarm costs speaking points.

pub mod core;
pub mod error;
pub mod types;

pub use error::{CoupleError, StoreError, ValidationError};

// =============================================================================
// PROFILE DEFAULTS
// =============================================================================

/// Speaking points every profile starts with
pub const DEFAULT_SPEAKING_POINTS: i64 = 5;

/// Like points every profile starts with
pub const DEFAULT_LIKE_POINTS: i64 = 1500;

/// Number of profiles in a couple
pub const PROFILES_PER_COUPLE: usize = 2;

/// Minimum shared password length (characters)
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// ROAD OF PEACE
// =============================================================================

/// Hard cap on the steps of a single dialogue round
pub const MAX_DIALOGUE_STEPS: i32 = 20;

/// Delay before a full dialogue round starts over (milliseconds)
pub const AUTO_RESTART_DELAY_MS: u64 = 1000;

// =============================================================================
// REWARDS
// =============================================================================

/// Like points for a profile's first apology in a dialogue
pub const APOLOGY_BONUS: i64 = 1000;

/// Like points each partner gets for resolving in time
pub const RESOLUTION_BONUS: i64 = 500;

/// Window, measured from the first message, in which a resolution earns the bonus
pub const RESOLUTION_WINDOW_MINUTES: i64 = 30;

/// Whole hours an alarm may go unanswered before speaking points are lost
pub const PENALTY_GRACE_HOURS: i64 = 1;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
