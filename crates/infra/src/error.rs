use thiserror::Error;

use marketplace_commission::CommissionError;
use marketplace_core::DomainError;

/// Storage failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Conditional write lost against a concurrent writer, or a duplicate insert.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    /// The backing storage cannot be used (e.g. poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored running total would leave the representable range.
    #[error("overflow: {0}")]
    Overflow(String),
}

/// Error of an application-level operation, mapped once at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Optimistic concurrency failure or duplicate.
    #[error("conflict: {0}")]
    Concurrency(String),

    /// Request failed validation, including rejected status transitions.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// No commission tiers have been configured.
    #[error("commission configuration missing")]
    ConfigurationMissing,

    #[error("store error: {0}")]
    Store(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::Conflict(msg) => ServiceError::Concurrency(msg),
            DomainError::Unauthorized => ServiceError::Unauthorized,
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => ServiceError::Concurrency(msg),
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::Unavailable(msg) => ServiceError::Store(msg),
            StoreError::Overflow(msg) => ServiceError::InvariantViolation(msg),
        }
    }
}

impl From<CommissionError> for ServiceError {
    fn from(value: CommissionError) -> Self {
        match value {
            CommissionError::ConfigurationMissing => ServiceError::ConfigurationMissing,
            CommissionError::InvalidTier { .. } | CommissionError::AmountOutOfRange(_) => {
                ServiceError::Validation(value.to_string())
            }
            CommissionError::Overflow(_) => ServiceError::InvariantViolation(value.to_string()),
            CommissionError::Conflict(msg) => ServiceError::Concurrency(msg),
            CommissionError::Unavailable(msg) => ServiceError::Store(msg),
        }
    }
}
