use std::time::Duration;

use thiserror::Error;

use crate::tweet::LookupField;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmartKeyError {
    #[error("malformed smart key: {0}")]
    Malformed(String),

    #[error("unable to decrypt smart key")]
    Decryption,

    #[error("unable to encrypt smart key")]
    Encryption,
}

/// Failures reported by an [`EngagementStore`](crate::store::EngagementStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store read timed out after {0:?}")]
    TimedOut(Duration),

    #[error("store data violates invariants: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("no user with {field} {value:?}")]
    NotFound { field: LookupField, value: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Decryption(#[from] SmartKeyError),

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl EngagementError {
    /// Decryption failures are reported to callers as authentication denials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Decryption(_))
    }
}
