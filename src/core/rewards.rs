//! RewardLedger: point rules
//!
//! Three independent rules:
//! - Alarm penalty: answering a partner's alarm late costs speaking points
//! - Apology bonus: a partner's first apology in a dialogue earns like points
//! - Resolution bonus: resolving within 30 minutes earns both partners like points
//!
//! The rule functions are pure; `RewardLedger` applies their deltas to the store.

use chrono::{DateTime, Duration, Utc};

use crate::core::ProfileStore;
use crate::types::{PointChange, PointField, ProfileId};
use crate::{APOLOGY_BONUS, PENALTY_GRACE_HOURS, RESOLUTION_BONUS, RESOLUTION_WINDOW_MINUTES};

/// Speaking-point delta for answering an alarm raised at `triggered_at`.
///
/// `-(whole_hours - 1)` once more than one whole hour has passed; `None`
/// whenever that would not be a loss.
pub fn alarm_penalty(triggered_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    let hours = (now - triggered_at).num_hours();
    let delta = -(hours - PENALTY_GRACE_HOURS);
    (delta < 0).then_some(delta)
}

/// Like-point delta for an apology
pub fn apology_bonus(already_apologised: bool) -> Option<i64> {
    (!already_apologised).then_some(APOLOGY_BONUS)
}

/// Like-point delta each partner gets when the dialogue ends.
///
/// Elapsed time runs from the first message; no messages counts as zero.
pub fn resolution_bonus(
    resolved: bool,
    first_message_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    if !resolved {
        return None;
    }
    let elapsed = first_message_at.map(|t| now - t).unwrap_or_else(Duration::zero);
    (elapsed <= Duration::minutes(RESOLUTION_WINDOW_MINUTES)).then_some(RESOLUTION_BONUS)
}

/// Applies rule results to the profile store
pub struct RewardLedger;

impl RewardLedger {
    /// Penalise `profile` for a late answer to an alarm
    pub fn apply_alarm_penalty(
        store: &mut ProfileStore,
        profile: &ProfileId,
        triggered_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<PointChange> {
        let delta = alarm_penalty(triggered_at, now)?;
        tracing::info!(profile = %profile, delta, "late answer to alarm");
        store.adjust_points(profile, PointField::Speaking, delta)
    }

    /// Reward an apology
    pub fn apply_apology_bonus(
        store: &mut ProfileStore,
        profile: &ProfileId,
        already_apologised: bool,
    ) -> Option<PointChange> {
        let delta = apology_bonus(already_apologised)?;
        store.adjust_points(profile, PointField::Like, delta)
    }

    /// Reward both partners for resolving in time
    pub fn apply_resolution_bonus(
        store: &mut ProfileStore,
        resolved: bool,
        first_message_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Vec<PointChange> {
        let Some(delta) = resolution_bonus(resolved, first_message_at, now) else {
            return Vec::new();
        };
        let ids: Vec<ProfileId> = store
            .account()
            .map(|a| a.profiles.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default();

        ids.iter()
            .filter_map(|id| store.adjust_points(id, PointField::Like, delta))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
