use std::sync::RwLock;

use chrono::{DateTime, Utc};

use marketplace_commission::{
    CommissionConfig, CommissionConfigStore, CommissionError, CommissionTier, find_overlaps,
    validate_tiers,
};
use marketplace_core::{ExpectedVersion, UserId};

/// In-memory holder of the single active commission configuration.
///
/// Replacing swaps the whole record under one write lock, so readers never
/// observe a missing or half-written tier list.
#[derive(Debug, Default)]
pub struct InMemoryCommissionConfigStore {
    active: RwLock<Option<CommissionConfig>>,
}

impl InMemoryCommissionConfigStore {
    /// Empty store: calculations fail with `ConfigurationMissing` until tiers are set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `tiers` as version 1.
    pub fn with_tiers(tiers: Vec<CommissionTier>) -> Result<Self, CommissionError> {
        let store = Self::new();
        store.replace(tiers, ExpectedVersion::Exact(0), None, Utc::now())?;
        Ok(store)
    }
}

fn poisoned<T>(_: T) -> CommissionError {
    CommissionError::Unavailable("lock poisoned".to_string())
}

impl CommissionConfigStore for InMemoryCommissionConfigStore {
    fn current(&self) -> Result<Option<CommissionConfig>, CommissionError> {
        let active = self.active.read().map_err(poisoned)?;
        Ok(active.clone())
    }

    fn replace(
        &self,
        tiers: Vec<CommissionTier>,
        expected: ExpectedVersion,
        updated_by: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> Result<CommissionConfig, CommissionError> {
        validate_tiers(&tiers)?;

        for (a, b) in find_overlaps(&tiers) {
            tracing::warn!(first = %a, second = %b, "commission tiers overlap; first match wins");
        }

        let mut active = self.active.write().map_err(poisoned)?;
        let current = active.as_ref().map(|c| c.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(CommissionError::Conflict(format!(
                "commission config: expected {expected:?}, found {current}"
            )));
        }

        let config = CommissionConfig {
            version: current + 1,
            tiers,
            updated_at,
            updated_by,
        };
        *active = Some(config.clone());

        tracing::info!(
            version = config.version,
            tiers = config.tiers.len(),
            "commission configuration replaced"
        );
        Ok(config)
    }
}
