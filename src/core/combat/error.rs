//! Error types for the combat module.
//!
//! Nothing here is fatal. Validation failures leave the tracker untouched,
//! record failures drop a single imported combatant, and snapshot failures
//! only happen at the file/JSON level.

use thiserror::Error;

/// Rejected user input (add form, adjustment amounts, edits).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Name was empty after trimming.
    #[error("Name is required")]
    EmptyName,

    /// Max HP was missing, non-numeric, non-finite or not positive.
    #[error("Max HP must be a positive whole number (got '{0}')")]
    InvalidMaxHp(String),

    /// Initiative was missing, non-numeric or non-finite.
    #[error("Initiative must be a whole number (got '{0}')")]
    InvalidInitiative(String),

    /// Damage/heal input did not resolve to a positive total.
    #[error("Enter one or more positive amounts (got '{0}')")]
    InvalidAdjustment(String),
}

/// Why a single imported combatant record was discarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no usable name")]
    MissingName,

    #[error("record has non-positive or missing max HP")]
    InvalidMaxHp,

    #[error("record is malformed: {0}")]
    Malformed(String),
}

/// Failure loading or saving a combat snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error for file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot was written by a newer version of the tracker.
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// Top-level payload was not a snapshot object or combatant array.
    #[error("Unrecognized snapshot layout: {0}")]
    Layout(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
