//! Infrastructure layer: stores, payout ledger and the order service that
//! composes them around the pure domain crates.

pub mod commission_store;
pub mod error;
pub mod order_service;
pub mod order_store;
pub mod payouts;

pub use commission_store::InMemoryCommissionConfigStore;
pub use error::{ServiceError, StoreError};
pub use order_service::OrderService;
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use payouts::{InMemoryPayoutLedger, PayoutLedger, PayoutRecord, SellerAccount};
