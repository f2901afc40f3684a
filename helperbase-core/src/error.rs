//! Error types for Helperbase operations

use crate::{EntityType, Role};
use thiserror::Error;
use uuid::Uuid;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity_type} with id {id} not found")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("{entity_type} already exists: {reason}")]
    Duplicate {
        entity_type: EntityType,
        reason: String,
    },

    #[error("Row store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Step {step} is out of range (form has {total_steps} steps)")]
    StepOutOfRange { step: usize, total_steps: usize },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Raised by callers that turn a denied policy check into a failure.
///
/// The policy functions themselves only ever return `bool`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Role {role} may not {action}")]
    Denied { role: Role, action: String },
}

/// Master error type for all Helperbase errors.
#[derive(Debug, Clone, Error)]
pub enum HelperbaseError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

/// Result type alias for Helperbase operations.
pub type HelperbaseResult<T> = Result<T, HelperbaseError>;
