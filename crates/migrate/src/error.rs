//! Error types for the migration engine.
//!
//! Every failure is fatal to the current run: no partial success is ever
//! reported as success, and the engine performs no retries. Retry policy is
//! an operator decision exercised by re-running the pass, optionally with
//! `force`.

use thiserror::Error;

use crate::unit::HookKind;

/// Result type alias for engine operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Top-level error for registration and orchestration.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The run request is malformed. Detected before any hook executes.
    #[error("Invalid run request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// Two units share an ordering number. Raised at registration time.
    #[error("Migration {0} is already registered")]
    DuplicateOrderingNumber(i64),

    /// The version store failed while reading or recording versions.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A hook reported failure. Compensation for the failing unit has
    /// already been attempted by the time this surfaces.
    #[error("{kind} hook failed for migration {label}: {cause}")]
    Hook {
        number: i64,
        label: String,
        kind: HookKind,
        cause: anyhow::Error,
    },
}

/// Validation failures for a [`crate::RunRequest`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Cannot exclude both pre and post scopes; omit both flags to run both")]
    NoScopeSelected,

    #[error("Cannot use force without a target version")]
    ForceWithoutTarget,

    #[error("Cannot run down migrations without a target version")]
    DownWithoutTarget,
}

/// Failures surfaced by a [`crate::VersionStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or read.
    #[error("Version store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a version write.
    #[error("Version store write failed: {0}")]
    WriteFailed(String),
}

impl MigrateError {
    /// Process exit code for CLI hosts.
    ///
    /// Validation failures carry distinct codes from execution failures so
    /// scripted callers can branch on cause.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::InvalidRequest(RequestError::NoScopeSelected) => 2,
            MigrateError::InvalidRequest(RequestError::ForceWithoutTarget) => 3,
            MigrateError::InvalidRequest(RequestError::DownWithoutTarget) => 6,
            MigrateError::DuplicateOrderingNumber(_) => 2,
            MigrateError::Hook { .. } => 4,
            MigrateError::Store(_) => 5,
        }
    }
}
