//! Marketplace orders domain module.
//!
//! This crate contains the order status rules (who may move which status axis,
//! and when) and the order aggregate, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod order;
pub mod role;
pub mod status;
pub mod transition;

pub use order::{
    Actor, Order, OrderCommand, OrderEvent, OrderPlaced, PlaceOrder, StatusUpdated, UpdateStatus,
};
pub use role::MarketRole;
pub use status::{
    AdminAction, BuyerAction, OrderStatus, PaymentStatus, ShippingStatus, StatusField,
    StatusUpdate,
};
pub use transition::{TransitionRejected, validate_status_update};
