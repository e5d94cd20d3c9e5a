//! Seller payout ledger: payment history and running balances.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marketplace_commission::{CommissionCalculation, TierId};
use marketplace_core::{OrderId, UserId};

use crate::error::StoreError;

/// One released payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    pub order_id: OrderId,
    pub seller_id: UserId,
    pub tier_id: TierId,
    pub gross_amount: Decimal,
    pub commission_amount: Decimal,
    pub settlement_amount: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl PayoutRecord {
    pub fn from_calculation(
        order_id: OrderId,
        seller_id: UserId,
        calc: &CommissionCalculation,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            seller_id,
            tier_id: calc.tier.id.clone(),
            gross_amount: calc.original_amount,
            commission_amount: calc.commission_amount,
            settlement_amount: calc.settlement_amount,
            recorded_at,
        }
    }
}

/// Balance plus payment history of one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAccount {
    pub seller_id: UserId,
    pub balance: Decimal,
    pub payouts: Vec<PayoutRecord>,
}

impl SellerAccount {
    fn empty(seller_id: UserId) -> Self {
        Self {
            seller_id,
            balance: Decimal::ZERO,
            payouts: Vec::new(),
        }
    }
}

pub trait PayoutLedger: Send + Sync {
    /// Append a payout and credit the seller by its settlement amount.
    ///
    /// At most one payout per order.
    fn record(&self, payout: PayoutRecord) -> Result<(), StoreError>;

    /// Account for `seller_id`; a seller without payouts has a zero balance.
    fn account(&self, seller_id: UserId) -> Result<SellerAccount, StoreError>;
}

impl<S> PayoutLedger for Arc<S>
where
    S: PayoutLedger + ?Sized,
{
    fn record(&self, payout: PayoutRecord) -> Result<(), StoreError> {
        (**self).record(payout)
    }

    fn account(&self, seller_id: UserId) -> Result<SellerAccount, StoreError> {
        (**self).account(seller_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPayoutLedger {
    accounts: RwLock<HashMap<UserId, SellerAccount>>,
}

impl InMemoryPayoutLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl PayoutLedger for InMemoryPayoutLedger {
    fn record(&self, payout: PayoutRecord) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;

        let already_paid = accounts
            .values()
            .flat_map(|a| a.payouts.iter())
            .any(|p| p.order_id == payout.order_id);
        if already_paid {
            return Err(StoreError::Conflict(format!(
                "payout for order {} already recorded",
                payout.order_id
            )));
        }

        let current = accounts
            .get(&payout.seller_id)
            .map_or(Decimal::ZERO, |a| a.balance);
        let balance = current
            .checked_add(payout.settlement_amount)
            .ok_or_else(|| {
                StoreError::Overflow(format!(
                    "balance of seller {} cannot absorb {}",
                    payout.seller_id, payout.settlement_amount
                ))
            })?;

        let account = accounts
            .entry(payout.seller_id)
            .or_insert_with(|| SellerAccount::empty(payout.seller_id));
        account.balance = balance;
        account.payouts.push(payout);
        Ok(())
    }

    fn account(&self, seller_id: UserId) -> Result<SellerAccount, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts
            .get(&seller_id)
            .cloned()
            .unwrap_or_else(|| SellerAccount::empty(seller_id)))
    }
}
