//! ProfileStore: the couple account and its persisted form
//!
//! Holds the single in-memory account and writes the whole record back to the
//! key-value store after every change. Unreadable stored data counts as "no
//! account yet" rather than an error.

use chrono::{DateTime, Utc};

use crate::core::secret;
use crate::core::store::{KeyValueStore, ACCOUNT_KEY, LEGACY_PASSWORD_KEY, LEGACY_PROFILES_KEY};
use crate::error::{CoupleError, StoreError, ValidationError};
use crate::types::{
    CoupleAccount, PointChange, PointField, Profile, ProfileId, ProfileInput, SharedSecret,
};
use crate::{MIN_PASSWORD_LEN, PROFILES_PER_COUPLE};

/// Owner of the couple account
pub struct ProfileStore {
    backend: Box<dyn KeyValueStore>,
    account: Option<CoupleAccount>,
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl ProfileStore {
    /// Open a store and load whatever account it holds
    pub fn open(backend: impl KeyValueStore + 'static) -> Self {
        let mut store = Self {
            backend: Box::new(backend),
            account: None,
        };
        store.account = store.load();
        store
    }

    /// Check registration input without touching state
    pub fn validate(password: &str, inputs: &[ProfileInput]) -> Result<(), ValidationError> {
        let len = password.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
                actual: len,
            });
        }
        if inputs.len() != PROFILES_PER_COUPLE {
            return Err(ValidationError::ProfileCount {
                expected: PROFILES_PER_COUPLE,
                actual: inputs.len(),
            });
        }
        if let Some(index) = inputs.iter().position(|p| p.name.trim().is_empty()) {
            return Err(ValidationError::EmptyName { index: index + 1 });
        }
        Ok(())
    }

    /// Register the couple: two fresh profiles under one password, persisted
    /// immediately. Replaces any existing account.
    pub fn create(
        &mut self,
        password: &str,
        inputs: &[ProfileInput],
        now: DateTime<Utc>,
    ) -> Result<&CoupleAccount, CoupleError> {
        Self::validate(password, inputs)?;

        let profiles = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| Profile::new(ProfileId::for_slot(i), input.name.trim(), &input.avatar))
            .collect();

        let account = CoupleAccount {
            password: secret::seal(password),
            profiles,
            created_at: now,
        };
        write_account(self.backend.as_mut(), &account)?;

        tracing::info!(profiles = PROFILES_PER_COUPLE, "couple account created");
        Ok(self.account.insert(account))
    }

    /// Read the account from storage. Missing or corrupt data gives `None`.
    pub fn load(&self) -> Option<CoupleAccount> {
        match self.backend.get(ACCOUNT_KEY) {
            Ok(Some(raw)) => decode_account(&raw),
            Ok(None) => self.load_legacy(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored account");
                None
            }
        }
    }

    /// Older builds kept profiles and password under separate keys
    fn load_legacy(&self) -> Option<CoupleAccount> {
        let profiles = self.backend.get(LEGACY_PROFILES_KEY).ok().flatten()?;
        let password = self.backend.get(LEGACY_PASSWORD_KEY).ok().flatten()?;

        let profiles: Vec<Profile> = match serde_json::from_str(&profiles) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, key = LEGACY_PROFILES_KEY, "stored profiles are corrupt");
                return None;
            }
        };
        // The old password key holds either a JSON string or the bare value
        let password = serde_json::from_str::<String>(&password).unwrap_or(password);

        let account = CoupleAccount {
            password: SharedSecret::from_stored(password),
            profiles,
            created_at: Utc::now(),
        };
        if !account.is_well_formed() {
            tracing::warn!(key = LEGACY_PROFILES_KEY, "stored profiles are not a couple");
            return None;
        }
        tracing::info!("loaded account from split legacy layout");
        Some(account)
    }

    /// Full overwrite of the stored account
    pub fn save(&mut self) -> Result<(), StoreError> {
        match &self.account {
            Some(account) => write_account(self.backend.as_mut(), account),
            None => Ok(()),
        }
    }

    /// Change one balance. Speaking points never drop below zero; like points
    /// are unbounded. Returns `None` when there is no such profile.
    pub fn adjust_points(
        &mut self,
        id: &ProfileId,
        field: PointField,
        delta: i64,
    ) -> Option<PointChange> {
        let profile = self.account.as_mut()?.profile_mut(id)?;
        let points = profile.points_mut(field);
        let before = *points;
        let after = match field {
            PointField::Speaking => before.saturating_add(delta).max(0),
            PointField::Like => before.saturating_add(delta),
        };
        *points = after;

        let change = PointChange {
            profile: id.clone(),
            field,
            requested: delta,
            applied: after.saturating_sub(before),
            balance: after,
        };
        tracing::debug!(profile = %id, %field, delta, balance = after, "points adjusted");

        if let Err(e) = self.save() {
            tracing::error!(error = %e, "failed to persist point change");
        }
        Some(change)
    }

    pub fn account(&self) -> Option<&CoupleAccount> {
        self.account.as_ref()
    }

    pub fn has_account(&self) -> bool {
        self.account.is_some()
    }

    pub fn profile(&self, id: &ProfileId) -> Option<&Profile> {
        self.account.as_ref()?.profile(id)
    }

    pub fn partner_of(&self, id: &ProfileId) -> Option<&Profile> {
        self.account.as_ref()?.partner_of(id)
    }

    /// Check a login attempt against the stored secret
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.account
            .as_ref()
            .map(|a| secret::verify(&a.password, candidate))
            .unwrap_or(false)
    }
}

fn write_account(backend: &mut dyn KeyValueStore, account: &CoupleAccount) -> Result<(), StoreError> {
    let json = serde_json::to_string(account)?;
    backend.set(ACCOUNT_KEY, &json)
}

fn decode_account(raw: &str) -> Option<CoupleAccount> {
    match serde_json::from_str::<CoupleAccount>(raw) {
        Ok(account) if account.is_well_formed() => Some(account),
        Ok(_) => {
            tracing::warn!(key = ACCOUNT_KEY, "stored account is not a valid couple");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, key = ACCOUNT_KEY, "stored account is corrupt");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn inputs() -> Vec<ProfileInput> {
        vec![
            ProfileInput::new("Alex", "🧑"),
            ProfileInput::new("Jordan", "👩"),
        ]
    }

    fn created() -> ProfileStore {
        let mut store = ProfileStore::open(MemoryStore::new());
        store.create("love123", &inputs(), Utc::now()).unwrap();
        store
    }

    #[test]
    fn test_create_defaults() {
        let store = created();
        let account = store.account().unwrap();
        assert_eq!(account.profiles.len(), 2);
        for p in &account.profiles {
            assert_eq!(p.speaking_points, 5);
            assert_eq!(p.like_points, 1500);
        }
        assert_eq!(account.profiles[0].id.as_str(), "profile1");
        assert_eq!(account.profiles[1].name, "Jordan");
    }

    #[test]
    fn test_create_rejects_short_password() {
        let mut store = ProfileStore::open(MemoryStore::new());
        let err = store.create("abc12", &inputs(), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoupleError::Validation(ValidationError::PasswordTooShort { min: 6, actual: 5 })
        ));
        assert!(!store.has_account());
    }

    #[test]
    fn test_create_rejects_wrong_profile_count() {
        let mut store = ProfileStore::open(MemoryStore::new());
        let one = vec![ProfileInput::new("Alex", "🧑")];
        let err = store.create("love123", &one, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoupleError::Validation(ValidationError::ProfileCount { actual: 1, .. })
        ));

        let mut three = inputs();
        three.push(ProfileInput::new("Sam", "🧔"));
        assert!(store.create("love123", &three, Utc::now()).is_err());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut store = ProfileStore::open(MemoryStore::new());
        let blank = vec![ProfileInput::new("Alex", "🧑"), ProfileInput::new("  ", "👩")];
        let err = store.create("love123", &blank, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoupleError::Validation(ValidationError::EmptyName { index: 2 })
        ));
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let store = created();
        let raw = store.backend.get(ACCOUNT_KEY).unwrap().unwrap();
        assert!(!raw.contains("love123"));
        assert!(store.verify_password("love123"));
        assert!(!store.verify_password("wrong!"));
    }

    #[test]
    fn test_load_roundtrip() {
        let store = created();
        let loaded = store.load().unwrap();
        assert_eq!(&loaded, store.account().unwrap());
    }

    #[test]
    fn test_corrupt_account_is_absent() {
        let store = ProfileStore::open(MemoryStore::with_entries([(ACCOUNT_KEY, "{not json")]));
        assert!(!store.has_account());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_single_profile_account_is_absent() {
        let raw = r#"{"password":"love123","profiles":[{"id":"profile1","name":"A","avatar":"x","speakingPoints":5,"likePoints":1500}],"createdAt":"2024-01-01T00:00:00Z"}"#;
        let store = ProfileStore::open(MemoryStore::with_entries([(ACCOUNT_KEY, raw)]));
        assert!(!store.has_account());
    }

    #[test]
    fn test_negative_stored_speaking_points_is_absent() {
        let raw = r#"{"password":"love123","profiles":[
            {"id":"profile1","name":"A","avatar":"x","speakingPoints":-9223372036854775808,"likePoints":1500},
            {"id":"profile2","name":"B","avatar":"y","speakingPoints":5,"likePoints":1500}
        ],"createdAt":"2024-01-01T00:00:00Z"}"#;
        let mut store = ProfileStore::open(MemoryStore::with_entries([(ACCOUNT_KEY, raw)]));
        assert!(!store.has_account());
        assert!(store
            .adjust_points(&ProfileId::for_slot(0), PointField::Speaking, -1)
            .is_none());
    }

    #[test]
    fn test_extreme_like_balance_saturates() {
        let mut store = created();
        let id = ProfileId::for_slot(1);
        store.adjust_points(&id, PointField::Like, i64::MIN).unwrap();

        let change = store.adjust_points(&id, PointField::Like, i64::MIN).unwrap();
        assert_eq!(change.balance, i64::MIN);
        assert_eq!(change.applied, -1500);

        let change = store.adjust_points(&id, PointField::Like, i64::MAX).unwrap();
        assert_eq!(change.balance, -1);
        assert_eq!(change.applied, i64::MAX);
    }

    #[test]
    fn test_legacy_split_layout() {
        let profiles = r#"[
            {"id":"profile1","name":"Alex","avatar":"🧑","speakingPoints":3,"likePoints":2500},
            {"id":"profile2","name":"Jordan","avatar":"👩","speakingPoints":5,"likePoints":1500}
        ]"#;
        let store = ProfileStore::open(MemoryStore::with_entries([
            (LEGACY_PROFILES_KEY, profiles),
            (LEGACY_PASSWORD_KEY, "love123"),
        ]));
        let account = store.account().unwrap();
        assert_eq!(account.profiles[0].speaking_points, 3);
        assert!(store.verify_password("love123"));
    }

    #[test]
    fn test_adjust_speaking_floors_at_zero() {
        let mut store = created();
        let id = ProfileId::for_slot(0);

        let change = store.adjust_points(&id, PointField::Speaking, -7).unwrap();
        assert_eq!(change.requested, -7);
        assert_eq!(change.applied, -5);
        assert_eq!(change.balance, 0);
        assert_eq!(store.profile(&id).unwrap().speaking_points, 0);
    }

    #[test]
    fn test_adjust_like_is_unbounded() {
        let mut store = created();
        let id = ProfileId::for_slot(1);

        store.adjust_points(&id, PointField::Like, -2000).unwrap();
        assert_eq!(store.profile(&id).unwrap().like_points, -500);
    }

    #[test]
    fn test_adjust_persists() {
        let mut store = created();
        let id = ProfileId::for_slot(1);
        store.adjust_points(&id, PointField::Like, 1000).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.profile(&id).unwrap().like_points, 2500);
    }

    #[test]
    fn test_adjust_unknown_profile() {
        let mut store = created();
        assert!(store.adjust_points(&"ghost".into(), PointField::Like, 1).is_none());
    }
}
