//! Error types for peacetalk
//!
//! Only registration and storage produce errors. Commands issued out of turn
//! or in the wrong state are not errors; they come back as
//! [`Outcome::Rejected`](crate::types::Outcome).

use thiserror::Error;

/// Bad registration input, shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("password must be at least {min} characters (got {actual})")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("a couple needs exactly {expected} profiles (got {actual})")]
    ProfileCount { expected: usize, actual: usize },

    #[error("profile {index} needs a name")]
    EmptyName { index: usize },
}

/// Failure of the local key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum CoupleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoupleError {
    /// Is this a user-facing validation problem (as opposed to storage)?
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
