//! Error types for the persistence core.
//!
//! Storage and parse failures are handled at the repository boundary.
//! Validation and transfer failures reach the caller verbatim, each carrying
//! a stable message key the UI layer translates.

use thiserror::Error;

/// Errors raised by a [`KvStore`](crate::store::KvStore) write.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would push the store past its size quota.
    #[error("storage quota exceeded writing '{key}' ({required} bytes needed, quota {quota})")]
    QuotaExceeded {
        key: String,
        required: usize,
        quota: usize,
    },

    /// Any other backend failure (I/O, poisoned lock, serialization).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` if the store is full, as opposed to broken.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            StoreError::QuotaExceeded { .. } => "error.storageFull",
            StoreError::Backend(_) => "error.storage",
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Admin-form and model invariant violations. Never mutate persisted state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    #[error("user not found: {0}")]
    UnknownUser(i64),

    #[error("'{0}' is not a member of the team")]
    NotATeamMember(String),

    #[error("team not found: {0}")]
    UnknownTeam(i64),

    #[error("chat channel not found: {0}")]
    UnknownChannel(String),

    #[error("answer option not found: {0}")]
    UnknownOption(String),

    #[error("position {index} out of bounds for list of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("incorrect admin password")]
    WrongPassword,
}

impl ValidationError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::DuplicateEmail(_) => "error.duplicateEmail",
            ValidationError::UnknownUser(_) => "error.userNotFound",
            ValidationError::NotATeamMember(_) => "error.leaderNotMember",
            ValidationError::UnknownTeam(_) => "error.teamNotFound",
            ValidationError::UnknownChannel(_) => "error.channelNotFound",
            ValidationError::UnknownOption(_) => "error.optionNotFound",
            ValidationError::OutOfBounds { .. } => "error.invalidPosition",
            ValidationError::WrongPassword => "error.wrongPassword",
        }
    }
}

/// Failures of bulk export/import.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The uploaded document is not a backup produced by export.
    #[error("invalid backup format: {0}")]
    InvalidFormat(String),

    /// Import was attempted without an explicit confirmation.
    #[error("import requires confirmation")]
    NotConfirmed,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write backup file: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    pub fn message_key(&self) -> &'static str {
        match self {
            TransferError::InvalidFormat(_) => "error.invalidFormat",
            TransferError::NotConfirmed => "error.importNotConfirmed",
            TransferError::Store(e) => e.message_key(),
            TransferError::Io(_) => "error.exportFailed",
        }
    }
}

/// Errors surfaced by orchestrator operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StateError {
    pub fn message_key(&self) -> &'static str {
        match self {
            StateError::Storage(e) => e.message_key(),
            StateError::Validation(e) => e.message_key(),
        }
    }

    /// Returns `true` if the in-memory change was kept but not persisted.
    pub fn is_storage_full(&self) -> bool {
        matches!(self, StateError::Storage(e) if e.is_quota_exceeded())
    }
}
