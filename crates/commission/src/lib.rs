//! Tiered platform commission.
//!
//! Maps a gross sale/payout amount to a platform fee and the seller's net
//! settlement, given an admin-managed tier list. Pure domain logic; the tier
//! list is read through the [`CommissionConfigStore`] port.

pub mod calculator;
pub mod config;
pub mod tier;

pub use calculator::{CommissionCalculation, calculate_commission, try_calculate_commission};
pub use config::{
    CommissionConfig, CommissionConfigStore, CommissionError, calculate_commission_for_amount,
    validate_tiers,
};
pub use tier::{CommissionTier, FeeKind, TierId, find_overlaps};
