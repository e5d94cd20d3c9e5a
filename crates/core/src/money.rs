//! Bounds on money amounts.

use rust_decimal::Decimal;

/// Largest gross amount accepted for an order or a commission quote: 10^15.
///
/// Keeps `amount * percent` far inside `Decimal`'s 96-bit range for any sane
/// tier value.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// `true` when `amount` lies in `0..=MAX_AMOUNT`.
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_AMOUNT
}
