use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a configured tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(Cow<'static, str>);

impl TierId {
    /// Id of the zero-fee tier used when nothing matches.
    pub const DEFAULT: TierId = TierId(Cow::Borrowed("default"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a tier's `value` turns into a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    /// `value` percent of the amount.
    Percent,
    /// `value` as an absolute fee.
    Flat,
}

/// A fee rule for amounts in `[min, max)`; `max: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub id: TierId,
    pub min: Decimal,
    #[serde(default)]
    pub max: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: FeeKind,
    pub value: Decimal,
}

impl CommissionTier {
    /// Zero-fee fallback: `{id: "default", min: 0, max: null, type: percent, value: 0}`.
    pub fn zero_fee_default() -> Self {
        Self {
            id: TierId::DEFAULT,
            min: Decimal::ZERO,
            max: None,
            kind: FeeKind::Percent,
            value: Decimal::ZERO,
        }
    }

    /// Lower bound inclusive, upper bound exclusive.
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && self.max.is_none_or(|max| amount < max)
    }

    /// Fee charged on `amount` under this tier.
    ///
    /// Flat fees are not clamped to `amount`; a flat fee above the amount
    /// yields a negative settlement.
    ///
    /// # Panics
    ///
    /// When `amount * value` leaves `Decimal`'s range. Use
    /// [`CommissionTier::checked_fee_for`] for unbounded input.
    pub fn fee_for(&self, amount: Decimal) -> Decimal {
        match self.kind {
            FeeKind::Percent => amount * self.value / Decimal::ONE_HUNDRED,
            FeeKind::Flat => self.value,
        }
    }

    /// Like [`CommissionTier::fee_for`], but `None` on overflow.
    pub fn checked_fee_for(&self, amount: Decimal) -> Option<Decimal> {
        match self.kind {
            FeeKind::Percent => amount
                .checked_mul(self.value)?
                .checked_div(Decimal::ONE_HUNDRED),
            FeeKind::Flat => Some(self.value),
        }
    }

    /// Check the per-tier invariants. Returns a human readable reason.
    pub fn check(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("id must not be empty".to_string());
        }
        if self.min < Decimal::ZERO {
            return Err("min must be >= 0".to_string());
        }
        if self.value < Decimal::ZERO {
            return Err("value must be >= 0".to_string());
        }
        if let Some(max) = self.max {
            if max <= self.min {
                return Err("max must be greater than min".to_string());
            }
        }
        Ok(())
    }

    fn overlaps(&self, other: &CommissionTier) -> bool {
        let self_below_other_max = other.max.is_none_or(|max| self.min < max);
        let other_below_self_max = self.max.is_none_or(|max| other.min < max);
        self_below_other_max && other_below_self_max
    }
}

/// Pairs of tiers whose ranges overlap.
///
/// Lookup is first-match, so overlaps are legal but usually a configuration
/// mistake; callers surface them as warnings.
pub fn find_overlaps(tiers: &[CommissionTier]) -> Vec<(TierId, TierId)> {
    let mut overlaps = Vec::new();
    for (i, a) in tiers.iter().enumerate() {
        for b in tiers.iter().skip(i + 1) {
            if a.overlaps(b) {
                overlaps.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &'static str, min: i64, max: Option<i64>) -> CommissionTier {
        CommissionTier {
            id: TierId::new(id),
            min: Decimal::from(min),
            max: max.map(Decimal::from),
            kind: FeeKind::Percent,
            value: Decimal::from(5),
        }
    }

    #[test]
    fn checked_fee_matches_fee_in_range_and_reports_overflow() {
        let t = tier("pct", 0, None);
        assert_eq!(t.checked_fee_for(Decimal::from(200)), Some(t.fee_for(Decimal::from(200))));

        let huge: Decimal = "10000000000000000000000000000".parse().unwrap();
        assert_eq!(t.checked_fee_for(huge), None);

        let flat = CommissionTier {
            kind: FeeKind::Flat,
            ..tier("flat", 0, None)
        };
        assert_eq!(flat.checked_fee_for(huge), Some(Decimal::from(5)));
    }

    #[test]
    fn range_is_half_open() {
        let t = tier("mid", 100, Some(200));
        assert!(!t.contains(Decimal::from(99)));
        assert!(t.contains(Decimal::from(100)));
        assert!(t.contains(Decimal::new(19_999, 2)));
        assert!(!t.contains(Decimal::from(200)));
    }

    #[test]
    fn unbounded_tier_contains_everything_above_min() {
        let t = tier("top", 1_000, None);
        assert!(t.contains(Decimal::from(1_000)));
        assert!(t.contains(Decimal::from(i64::MAX)));
    }

    #[test]
    fn check_reports_broken_invariants() {
        assert!(tier("ok", 0, Some(10)).check().is_ok());
        assert_eq!(tier("", 0, None).check(), Err("id must not be empty".to_string()));
        assert_eq!(tier("neg", -1, None).check(), Err("min must be >= 0".to_string()));
        assert_eq!(
            tier("inverted", 10, Some(10)).check(),
            Err("max must be greater than min".to_string())
        );

        let mut negative_fee = tier("fee", 0, None);
        negative_fee.value = Decimal::NEGATIVE_ONE;
        assert_eq!(negative_fee.check(), Err("value must be >= 0".to_string()));
    }

    #[test]
    fn adjacent_tiers_do_not_overlap() {
        let tiers = vec![tier("a", 0, Some(100)), tier("b", 100, Some(500)), tier("c", 500, None)];
        assert!(find_overlaps(&tiers).is_empty());
    }

    #[test]
    fn overlapping_tiers_are_reported_pairwise() {
        let tiers = vec![tier("a", 0, Some(100)), tier("b", 50, None)];
        assert_eq!(
            find_overlaps(&tiers),
            vec![(TierId::new("a"), TierId::new("b"))]
        );
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = serde_json::json!({
            "id": "small",
            "min": 0,
            "max": null,
            "type": "flat",
            "value": "2.50",
        });
        let t: CommissionTier = serde_json::from_value(json).unwrap();
        assert_eq!(t.kind, FeeKind::Flat);
        assert_eq!(t.max, None);
        assert_eq!(t.value, Decimal::new(250, 2));
    }
}
