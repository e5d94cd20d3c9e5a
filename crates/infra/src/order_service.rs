//! Order command execution (application-level orchestration).
//!
//! ```text
//! Command
//!   ↓
//! 1. Load order from the store
//!   ↓
//! 2. Handle command (pure decision logic, produces events)
//!   ↓
//! 3. Price the payout if payment is being released
//!   ↓
//! 4. Apply events and save with a version check
//!   ↓
//! 5. Record the payout in the seller ledger
//! ```
//!
//! Everything that can fail on business grounds (rejected transition, missing
//! commission configuration, out-of-range amount) fails before anything is
//! written. If the ledger refuses the payout after the save, the order is
//! written back at its previous version and the ledger error is returned.

use std::sync::Arc;

use rust_decimal::Decimal;

use marketplace_commission::{
    CommissionCalculation, CommissionConfigStore, calculate_commission_for_amount,
};
use marketplace_core::{Aggregate, AggregateRoot, ExpectedVersion, OrderId, UserId};
use marketplace_orders::{Order, OrderCommand, OrderEvent, PlaceOrder, UpdateStatus};

use crate::error::ServiceError;
use crate::order_store::OrderStore;
use crate::payouts::{PayoutLedger, PayoutRecord, SellerAccount};

/// Composes the order store, the commission configuration and the payout
/// ledger around the order aggregate.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    commission: Arc<dyn CommissionConfigStore>,
    payouts: Arc<dyn PayoutLedger>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        commission: Arc<dyn CommissionConfigStore>,
        payouts: Arc<dyn PayoutLedger>,
    ) -> Self {
        Self {
            orders,
            commission,
            payouts,
        }
    }

    pub fn commission_store(&self) -> &Arc<dyn CommissionConfigStore> {
        &self.commission
    }

    pub fn place_order(&self, cmd: PlaceOrder) -> Result<Order, ServiceError> {
        let mut order = Order::empty(cmd.order_id);
        let events = order.handle(&OrderCommand::PlaceOrder(cmd))?;
        for event in &events {
            order.apply(event);
        }

        self.orders.insert(order.clone())?;
        log_events(&events);
        Ok(order)
    }

    /// Validate and apply a status update, releasing the payout when the
    /// update marks payment as paid.
    pub fn update_status(&self, cmd: UpdateStatus) -> Result<Order, ServiceError> {
        let mut order = self
            .orders
            .find_by_id(cmd.order_id)?
            .ok_or(ServiceError::NotFound)?;
        let expected = ExpectedVersion::Exact(order.version());
        let actor = cmd.actor;

        let events = match order.handle(&OrderCommand::UpdateStatus(cmd)) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id_typed(),
                    role = %actor.role,
                    error = %e,
                    "status update rejected"
                );
                return Err(e.into());
            }
        };

        let releases_payment = events
            .iter()
            .any(|e| matches!(e, OrderEvent::StatusUpdated(u) if u.releases_payment()));
        let payout = if releases_payment {
            Some(self.price_payout(&order)?)
        } else {
            None
        };

        let previous = order.clone();
        for event in &events {
            order.apply(event);
        }
        self.orders.save(order.clone(), expected)?;
        log_events(&events);

        if let Some(calc) = payout {
            if let Err(e) = self.record_payout(&order, &calc) {
                self.roll_back(previous, &order);
                return Err(e);
            }
        }

        Ok(order)
    }

    /// Restore `previous` over the just-saved `saved`.
    fn roll_back(&self, previous: Order, saved: &Order) {
        let order_id = saved.id_typed();
        match self
            .orders
            .save(previous, ExpectedVersion::Exact(saved.version()))
        {
            Ok(()) => tracing::warn!(%order_id, "payout not recorded; status update rolled back"),
            Err(e) => tracing::error!(
                %order_id,
                error = %e,
                "payout not recorded and rollback failed; order left as paid"
            ),
        }
    }

    pub fn get_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.orders
            .find_by_id(order_id)?
            .ok_or(ServiceError::NotFound)
    }

    pub fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.list_for_user(user_id)?)
    }

    pub fn seller_account(&self, seller_id: UserId) -> Result<SellerAccount, ServiceError> {
        Ok(self.payouts.account(seller_id)?)
    }

    /// Commission breakdown for `amount` under the active configuration.
    pub fn quote_commission(&self, amount: Decimal) -> Result<CommissionCalculation, ServiceError> {
        Ok(calculate_commission_for_amount(&self.commission, amount)?)
    }

    fn price_payout(&self, order: &Order) -> Result<CommissionCalculation, ServiceError> {
        calculate_commission_for_amount(&self.commission, order.amount()).map_err(|e| {
            tracing::error!(order_id = %order.id_typed(), error = %e, "cannot price payout");
            ServiceError::from(e)
        })
    }

    fn record_payout(&self, order: &Order, calc: &CommissionCalculation) -> Result<(), ServiceError> {
        let seller_id = order
            .seller_id()
            .ok_or_else(|| ServiceError::InvariantViolation("order has no seller".to_string()))?;
        let recorded_at = order.updated_at().unwrap_or_else(chrono::Utc::now);

        self.payouts
            .record(PayoutRecord::from_calculation(
                order.id_typed(),
                seller_id,
                calc,
                recorded_at,
            ))
            .map_err(|e| {
                tracing::error!(order_id = %order.id_typed(), error = %e, "cannot record payout");
                ServiceError::from(e)
            })?;

        tracing::info!(
            order_id = %order.id_typed(),
            seller_id = %seller_id,
            tier = %calc.tier.id,
            commission = %calc.commission_amount,
            settlement = %calc.settlement_amount,
            "payout recorded"
        );
        Ok(())
    }
}

fn log_events(events: &[OrderEvent]) {
    for event in events {
        match event {
            OrderEvent::OrderPlaced(e) => tracing::info!(
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                order_id = %e.order_id,
                amount = %e.amount,
                "order placed"
            ),
            OrderEvent::StatusUpdated(e) => tracing::info!(
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                order_id = %e.order_id,
                role = %e.actor.role,
                shipping = ?e.current.shipping,
                buyer_action = ?e.current.buyer_action,
                payment = ?e.current.payment,
                admin_action = ?e.current.admin_action,
                "order status updated"
            ),
        }
    }
}
