//! Profiles and the couple account that owns them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_LIKE_POINTS, DEFAULT_SPEAKING_POINTS};

/// Identifier of one partner, unique within the couple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id assigned to the profile at `index` (0-based) during registration
    pub fn for_slot(index: usize) -> Self {
        Self(format!("profile{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProfileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One partner: identity, avatar and point balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    /// Avatar glyph (usually a single emoji)
    pub avatar: String,
    pub speaking_points: i64,
    pub like_points: i64,
}

impl Profile {
    /// Create a profile with the default balances
    pub fn new(id: ProfileId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
            speaking_points: DEFAULT_SPEAKING_POINTS,
            like_points: DEFAULT_LIKE_POINTS,
        }
    }

    pub fn points(&self, field: PointField) -> i64 {
        match field {
            PointField::Speaking => self.speaking_points,
            PointField::Like => self.like_points,
        }
    }

    pub(crate) fn points_mut(&mut self, field: PointField) -> &mut i64 {
        match field {
            PointField::Speaking => &mut self.speaking_points,
            PointField::Like => &mut self.like_points,
        }
    }
}

/// Registration input for one partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub avatar: String,
}

impl ProfileInput {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Which balance a point change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointField {
    Speaking,
    Like,
}

impl fmt::Display for PointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointField::Speaking => f.write_str("speaking"),
            PointField::Like => f.write_str("like"),
        }
    }
}

/// Persisted form of the shared password.
///
/// Either `sha256:<salt-hex>:<digest-hex>` or, for accounts written by older
/// builds, the plaintext password itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub(crate) fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_stored(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// The shared record of both partners under one password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleAccount {
    pub password: SharedSecret,
    pub profiles: Vec<Profile>,
    pub created_at: DateTime<Utc>,
}

impl CoupleAccount {
    pub fn profile(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    pub(crate) fn profile_mut(&mut self, id: &ProfileId) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| &p.id == id)
    }

    /// The other partner
    pub fn partner_of(&self, id: &ProfileId) -> Option<&Profile> {
        if self.profile(id).is_none() {
            return None;
        }
        self.profiles.iter().find(|p| &p.id != id)
    }

    /// Exactly two profiles with distinct ids and no negative speaking points
    pub fn is_well_formed(&self) -> bool {
        self.profiles.len() == crate::PROFILES_PER_COUPLE
            && self.profiles[0].id != self.profiles[1].id
            && self.profiles.iter().all(|p| p.speaking_points >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_account() -> CoupleAccount {
        CoupleAccount {
            password: SharedSecret::from_stored("love123"),
            profiles: vec![
                Profile::new(ProfileId::for_slot(0), "Alex", "🧑"),
                Profile::new(ProfileId::for_slot(1), "Jordan", "👩"),
            ],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("p".into(), "Alex", "🧑");
        assert_eq!(profile.speaking_points, 5);
        assert_eq!(profile.like_points, 1500);
    }

    #[test]
    fn test_slot_ids() {
        assert_eq!(ProfileId::for_slot(0).as_str(), "profile1");
        assert_eq!(ProfileId::for_slot(1).as_str(), "profile2");
    }

    #[test]
    fn test_partner_lookup() {
        let account = make_account();
        let partner = account.partner_of(&"profile1".into()).unwrap();
        assert_eq!(partner.name, "Jordan");
        assert!(account.partner_of(&"nobody".into()).is_none());
    }

    #[test]
    fn test_well_formed() {
        let mut account = make_account();
        assert!(account.is_well_formed());

        account.profiles[1].id = ProfileId::for_slot(0);
        assert!(!account.is_well_formed());

        account.profiles.pop();
        assert!(!account.is_well_formed());
    }

    #[test]
    fn test_negative_speaking_points_not_well_formed() {
        let mut account = make_account();
        account.profiles[0].speaking_points = -1;
        assert!(!account.is_well_formed());

        account.profiles[0].speaking_points = 0;
        account.profiles[1].like_points = -40;
        assert!(account.is_well_formed());
    }

    #[test]
    fn test_account_json_layout() {
        let json = serde_json::to_value(make_account()).unwrap();
        assert_eq!(json["password"], "love123");
        assert_eq!(json["profiles"][0]["speakingPoints"], 5);
        assert_eq!(json["profiles"][1]["likePoints"], 1500);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SharedSecret::from_stored("love123");
        assert!(!format!("{:?}", secret).contains("love123"));
    }
}
