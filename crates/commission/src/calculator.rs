use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tier::CommissionTier;

/// Fee breakdown for one amount.
///
/// `settlement_amount == original_amount - commission_amount`. Nothing is
/// rounded; currency rounding is a display concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionCalculation {
    pub tier: CommissionTier,
    pub commission_amount: Decimal,
    pub settlement_amount: Decimal,
    pub original_amount: Decimal,
}

/// Compute the platform fee for `amount`.
///
/// Tiers are scanned in list order and the first one containing `amount`
/// wins, even if a later tier would also match. When none matches, the
/// zero-fee default tier applies.
///
/// # Panics
///
/// When the fee or the settlement overflows `Decimal`. Input that is not
/// bounded by the caller goes through [`try_calculate_commission`].
pub fn calculate_commission(amount: Decimal, tiers: &[CommissionTier]) -> CommissionCalculation {
    let tier = select_tier(amount, tiers);
    let commission_amount = tier.fee_for(amount);

    CommissionCalculation {
        tier,
        commission_amount,
        settlement_amount: amount - commission_amount,
        original_amount: amount,
    }
}

/// Overflow-checked [`calculate_commission`]; same result for every input
/// that does not overflow, `None` otherwise.
pub fn try_calculate_commission(
    amount: Decimal,
    tiers: &[CommissionTier],
) -> Option<CommissionCalculation> {
    let tier = select_tier(amount, tiers);
    let commission_amount = tier.checked_fee_for(amount)?;
    let settlement_amount = amount.checked_sub(commission_amount)?;

    Some(CommissionCalculation {
        tier,
        commission_amount,
        settlement_amount,
        original_amount: amount,
    })
}

fn select_tier(amount: Decimal, tiers: &[CommissionTier]) -> CommissionTier {
    tiers
        .iter()
        .find(|t| t.contains(amount))
        .cloned()
        .unwrap_or_else(CommissionTier::zero_fee_default)
}
