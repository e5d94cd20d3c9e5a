use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use marketplace_core::{AggregateRoot, ExpectedVersion, OrderId, UserId};
use marketplace_orders::Order;

use crate::error::StoreError;

/// Order persistence port.
///
/// Writes are conditional: `save` only succeeds when the stored order is still
/// at `expected` version, so two concurrent status updates cannot both win.
pub trait OrderStore: Send + Sync {
    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Store a freshly placed order. Fails if the id is taken.
    fn insert(&self, order: Order) -> Result<(), StoreError>;

    /// Replace a stored order, checking its current version against `expected`.
    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// Orders where `user_id` is the buyer or the seller.
    fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).find_by_id(order_id)
    }

    fn insert(&self, order: Order) -> Result<(), StoreError> {
        (**self).insert(order)
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(order, expected)
    }

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).list_for_user(user_id)
    }
}

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl OrderStore for InMemoryOrderStore {
    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&order_id).cloned())
    }

    fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let id = order.id_typed();
        if map.contains_key(&id) {
            return Err(StoreError::Conflict(format!("order {id} already exists")));
        }
        map.insert(id, order);
        Ok(())
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let id = order.id_typed();
        let stored = map.get(&id).ok_or(StoreError::NotFound)?;

        let current = stored.version();
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "order {id}: expected {expected:?}, found {current}"
            )));
        }

        map.insert(id, order);
        Ok(())
    }

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut orders: Vec<Order> = map
            .values()
            .filter(|o| o.involves(user_id))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.placed_at());
        Ok(orders)
    }
}
