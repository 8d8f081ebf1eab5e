//! Error types for the shift payroll engine.
//!
//! Every rule violation surfaces as one strongly-typed [`EngineError`]
//! variant. The four business kinds (validation, authorization, not found,
//! state conflict) are what callers branch on; the remaining variants cover
//! configuration and storage failures.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the shift payroll engine.
///
/// # Example
///
/// ```
/// use shift_payroll::error::EngineError;
///
/// let error = EngineError::validation("end_time", "end time is before start time");
/// assert_eq!(error.kind(), "VALIDATION_ERROR");
/// assert_eq!(error.to_string(), "Invalid end_time: end time is before start time");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Malformed or missing input.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The input field that was rejected.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The caller has no relationship with, or does not own, the target entity.
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// Why access was refused.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "timesheet").
        entity: &'static str,
        /// The id that was looked up.
        id: Uuid,
    },

    /// The operation is not allowed from the entity's current state.
    #[error("Conflicting state for {entity} '{id}': {message}")]
    StateConflict {
        /// The kind of entity (e.g. "payslip").
        entity: &'static str,
        /// The id of the entity.
        id: Uuid,
        /// A description of the conflict.
        message: String,
    },

    /// The backing store could not be accessed.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::Unauthorized`] error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Builds a [`EngineError::NotFound`] error.
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Builds a [`EngineError::StateConflict`] error.
    pub fn state_conflict(entity: &'static str, id: Uuid, message: impl Into<String>) -> Self {
        Self::StateConflict {
            entity,
            id,
            message: message.into(),
        }
    }

    /// Returns the stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => "CONFIG_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unauthorized { .. } => "AUTHORIZATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StateConflict { .. } => "STATE_CONFLICT",
            Self::StorageUnavailable { .. } => "STORAGE_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
