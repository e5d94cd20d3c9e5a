//! Active commission configuration and the store port it is read through.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marketplace_core::{ExpectedVersion, MAX_AMOUNT, UserId, is_valid_amount};

use crate::calculator::{CommissionCalculation, try_calculate_commission};
use crate::tier::CommissionTier;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommissionError {
    /// No tier list has ever been configured.
    #[error("commission configuration missing")]
    ConfigurationMissing,

    /// Amount outside `0..=MAX_AMOUNT`.
    #[error("amount {0} is outside 0..={max}", max = MAX_AMOUNT)]
    AmountOutOfRange(Decimal),

    /// The fee or settlement does not fit in a `Decimal`.
    #[error("commission for amount {0} overflows")]
    Overflow(Decimal),

    #[error("invalid tier '{id}': {reason}")]
    InvalidTier { id: String, reason: String },

    /// Stale expected version on replace.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("commission store unavailable: {0}")]
    Unavailable(String),
}

/// The single active tier configuration.
///
/// `version` starts at 1 for the first stored configuration and increases by
/// one on every replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfig {
    pub version: u64,
    pub tiers: Vec<CommissionTier>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
}

/// Storage port for the active commission configuration.
///
/// Implementations must make `replace` atomic: readers see either the old or
/// the new tier list, never a mix or nothing.
pub trait CommissionConfigStore: Send + Sync {
    fn current(&self) -> Result<Option<CommissionConfig>, CommissionError>;

    /// Swap in a new tier list.
    ///
    /// `expected` is checked against the current version (0 when nothing has
    /// been configured yet).
    fn replace(
        &self,
        tiers: Vec<CommissionTier>,
        expected: ExpectedVersion,
        updated_by: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> Result<CommissionConfig, CommissionError>;
}

impl<S> CommissionConfigStore for Arc<S>
where
    S: CommissionConfigStore + ?Sized,
{
    fn current(&self) -> Result<Option<CommissionConfig>, CommissionError> {
        (**self).current()
    }

    fn replace(
        &self,
        tiers: Vec<CommissionTier>,
        expected: ExpectedVersion,
        updated_by: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> Result<CommissionConfig, CommissionError> {
        (**self).replace(tiers, expected, updated_by, updated_at)
    }
}

/// Validate a tier list before it is stored.
pub fn validate_tiers(tiers: &[CommissionTier]) -> Result<(), CommissionError> {
    let mut seen = HashSet::new();
    for tier in tiers {
        tier.check().map_err(|reason| CommissionError::InvalidTier {
            id: tier.id.to_string(),
            reason,
        })?;
        if !seen.insert(tier.id.as_str()) {
            return Err(CommissionError::InvalidTier {
                id: tier.id.to_string(),
                reason: "duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

/// Load the active tiers and compute the commission for `amount`.
///
/// Fails with [`CommissionError::ConfigurationMissing`] only when no
/// configuration exists at all. A configured but non-matching (or empty) tier
/// list still succeeds with the zero-fee default.
///
/// Amounts outside `0..=MAX_AMOUNT` are refused, and arithmetic is
/// overflow-checked, so no input panics.
pub fn calculate_commission_for_amount<S>(
    store: &S,
    amount: Decimal,
) -> Result<CommissionCalculation, CommissionError>
where
    S: CommissionConfigStore + ?Sized,
{
    let config = store
        .current()?
        .ok_or(CommissionError::ConfigurationMissing)?;
    if !is_valid_amount(amount) {
        return Err(CommissionError::AmountOutOfRange(amount));
    }
    try_calculate_commission(amount, &config.tiers).ok_or(CommissionError::Overflow(amount))
}
