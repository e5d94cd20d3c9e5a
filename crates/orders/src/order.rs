use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marketplace_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, MAX_AMOUNT, OrderId, UserId,
};

use crate::role::MarketRole;
use crate::status::{OrderStatus, PaymentStatus, ShippingStatus, StatusUpdate};
use crate::transition::validate_status_update;

/// Who is acting on an order, and in which capacity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: MarketRole,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    buyer_id: Option<UserId>,
    seller_id: Option<UserId>,
    /// Gross sale amount in the listing currency.
    amount: Decimal,
    status: OrderStatus,
    placed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-placed aggregate instance.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            buyer_id: None,
            seller_id: None,
            amount: Decimal::ZERO,
            status: OrderStatus::default(),
            placed_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    pub fn seller_id(&self) -> Option<UserId> {
        self.seller_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_placed(&self) -> bool {
        self.created
    }

    /// Whether `user_id` is the buyer or the seller of this order.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.buyer_id == Some(user_id) || self.seller_id == Some(user_id)
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub order_id: OrderId,
    pub actor: Actor,
    pub updates: StatusUpdate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    UpdateStatus(UpdateStatus),
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusUpdated.
///
/// `applied` is the update as persisted, which may differ from the requested
/// one (a buyer confirming receipt also finalizes shipping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdated {
    pub order_id: OrderId,
    pub actor: Actor,
    pub applied: StatusUpdate,
    pub previous: OrderStatus,
    pub current: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

impl StatusUpdated {
    /// This update moved payment from pending to paid.
    pub fn releases_payment(&self) -> bool {
        self.previous.payment == PaymentStatus::Pending
            && self.current.payment == PaymentStatus::Paid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    StatusUpdated(StatusUpdated),
}

impl OrderEvent {
    /// Stable event name (e.g. for logs and audit trails).
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::StatusUpdated(_) => "orders.order.status_updated",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::StatusUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.buyer_id = Some(e.buyer_id);
                self.seller_id = Some(e.seller_id);
                self.amount = e.amount;
                self.status = OrderStatus::default();
                self.placed_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::StatusUpdated(e) => {
                self.status = e.current;
            }
        }

        self.updated_at = Some(event.occurred_at());
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::UpdateStatus(cmd) => self.handle_update_status(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> DomainResult<()> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    /// Buyers and sellers may only act on their own orders.
    fn ensure_party(&self, actor: &Actor) -> DomainResult<()> {
        let party = match actor.role {
            MarketRole::Buyer => self.buyer_id,
            MarketRole::Seller => self.seller_id,
            MarketRole::Admin => return Ok(()),
        };
        if party != Some(actor.user_id) {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> DomainResult<Vec<OrderEvent>> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }
        self.ensure_order_id(cmd.order_id)?;

        if cmd.amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount must be positive"));
        }
        if cmd.amount > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "amount must not exceed {MAX_AMOUNT}"
            )));
        }

        if cmd.buyer_id == cmd.seller_id {
            return Err(DomainError::validation("buyer and seller must differ"));
        }

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            buyer_id: cmd.buyer_id,
            seller_id: cmd.seller_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_status(&self, cmd: &UpdateStatus) -> DomainResult<Vec<OrderEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        if cmd.updates.is_empty() {
            return Err(DomainError::validation("no status fields to update"));
        }

        self.ensure_party(&cmd.actor)?;

        validate_status_update(&self.status, &cmd.updates, cmd.actor.role)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut applied = cmd.updates;
        if cmd.actor.role == MarketRole::Buyer && applied.is_buyer_receipt() {
            applied.shipping = Some(ShippingStatus::Received);
        }

        self.ensure_payment_transition(&applied)?;

        Ok(vec![OrderEvent::StatusUpdated(StatusUpdated {
            order_id: cmd.order_id,
            actor: cmd.actor,
            applied,
            previous: self.status,
            current: applied.apply_to(&self.status),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn ensure_payment_transition(&self, applied: &StatusUpdate) -> DomainResult<()> {
        match (self.status.payment, applied.payment) {
            (PaymentStatus::Paid, Some(PaymentStatus::Pending)) => Err(DomainError::invariant(
                "payment cannot be reverted once released",
            )),
            (PaymentStatus::Pending, Some(PaymentStatus::Paid))
                if !self.status.can_release_payment() =>
            {
                Err(DomainError::invariant(
                    "payment can only be released after the buyer confirms receipt",
                ))
            }
            _ => Ok(()),
        }
    }
}
