//! Service wiring: in-memory stores composed into the order service.

use std::sync::Arc;

use chrono::Utc;

use marketplace_commission::{CommissionConfig, CommissionError, CommissionTier};
use marketplace_core::{ExpectedVersion, UserId};
use marketplace_infra::{
    InMemoryCommissionConfigStore, InMemoryOrderStore, InMemoryPayoutLedger, OrderService,
    ServiceError,
};

pub struct AppServices {
    pub orders: OrderService,
}

impl AppServices {
    pub fn commission_config(&self) -> Result<Option<CommissionConfig>, ServiceError> {
        Ok(self.orders.commission_store().current()?)
    }

    pub fn replace_commission_tiers(
        &self,
        tiers: Vec<CommissionTier>,
        expected: ExpectedVersion,
        actor: UserId,
    ) -> Result<CommissionConfig, ServiceError> {
        Ok(self
            .orders
            .commission_store()
            .replace(tiers, expected, Some(actor), Utc::now())?)
    }
}

/// Wire the in-memory stores, seeding the commission configuration when
/// `tiers` is given.
pub fn build_services(tiers: Option<Vec<CommissionTier>>) -> Result<AppServices, CommissionError> {
    let commission = match tiers {
        Some(tiers) => InMemoryCommissionConfigStore::with_tiers(tiers)?,
        None => {
            tracing::warn!("no commission tiers configured; payouts are blocked until an admin sets them");
            InMemoryCommissionConfigStore::new()
        }
    };

    let orders = OrderService::new(
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(commission),
        Arc::new(InMemoryPayoutLedger::new()),
    );

    Ok(AppServices { orders })
}
