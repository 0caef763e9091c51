//! Error types for the library layer.

use std::fmt;

use daftar_store::StoreError;

use crate::executor::CommitError;
use crate::profile::ProfileError;

/// Errors produced by the import pipeline, wrapping profile validation,
/// store boundary, and commit failures.
#[derive(Debug)]
pub enum ImportError {
    /// The import profile failed parsing or validation.
    Profile(ProfileError),
    /// A record store operation failed.
    Store(StoreError),
    /// The commit step failed, possibly after partial application.
    Commit(CommitError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(e) => write!(f, "Profile error: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::Commit(e) => write!(f, "Commit error: {}", e),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Profile(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Commit(e) => Some(e),
        }
    }
}

impl From<ProfileError> for ImportError {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

impl From<StoreError> for ImportError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<CommitError> for ImportError {
    fn from(e: CommitError) -> Self {
        Self::Commit(e)
    }
}
