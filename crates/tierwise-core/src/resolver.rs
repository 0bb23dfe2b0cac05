//! # Tier Resolver
//!
//! A segment's tier table, normalized once at construction so that lookups
//! never depend on the order tiers were stored in.
//!
//! ```text
//!   stored:   [{48, 29.5%}, {12, 14.07%}, {12, 15%}]
//!                          │ sort by minQuantity (stable), last duplicate wins
//!                          ▼
//!   table:    [{12, 15%}, {48, 29.5%}]
//!
//!   resolve(5)  → None
//!   resolve(12) → {12, 15%}
//!   resolve(47) → {12, 15%}
//!   resolve(50) → {48, 29.5%}
//! ```

use crate::types::{DiscountRate, Tier};

/// Tiers sorted ascending by `min_quantity`, thresholds distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    /// Builds a table from tiers in any order.
    ///
    /// Duplicate thresholds keep the last one supplied. The thresholds that
    /// were duplicated are returned so the caller can report them.
    pub fn normalize(mut tiers: Vec<Tier>) -> (Self, Vec<i64>) {
        tiers.sort_by_key(|t| t.min_quantity);

        let mut deduped: Vec<Tier> = Vec::with_capacity(tiers.len());
        let mut duplicates = Vec::new();
        for tier in tiers {
            match deduped.last_mut() {
                Some(last) if last.min_quantity == tier.min_quantity => {
                    if duplicates.last() != Some(&tier.min_quantity) {
                        duplicates.push(tier.min_quantity);
                    }
                    *last = tier;
                }
                _ => deduped.push(tier),
            }
        }

        (TierTable { tiers: deduped }, duplicates)
    }

    /// Builds a table, discarding duplicate information.
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self::normalize(tiers).0
    }

    /// Returns the tier with the largest threshold `<= quantity`.
    ///
    /// ## Example
    /// ```rust
    /// use tierwise_core::resolver::TierTable;
    /// use tierwise_core::types::{DiscountRate, Tier};
    ///
    /// let table = TierTable::new(vec![
    ///     Tier::new(48, DiscountRate::from_bps(2950)),
    ///     Tier::new(12, DiscountRate::from_bps(1407)),
    /// ]);
    ///
    /// assert!(table.resolve(11).is_none());
    /// assert_eq!(table.resolve(18).unwrap().min_quantity, 12);
    /// assert_eq!(table.resolve(50).unwrap().min_quantity, 48);
    /// ```
    pub fn resolve(&self, quantity: i64) -> Option<&Tier> {
        if quantity <= 0 {
            return None;
        }
        let reached = self.tiers.partition_point(|t| t.min_quantity <= quantity);
        reached.checked_sub(1).map(|i| &self.tiers[i])
    }

    /// The discount a quantity earns on its own; zero below the lowest tier.
    pub fn rate_for(&self, quantity: i64) -> DiscountRate {
        self.resolve(quantity)
            .map(|t| t.discount_percent)
            .unwrap_or_else(DiscountRate::zero)
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tier(min: i64, bps: u32) -> Tier {
        Tier::new(min, DiscountRate::from_bps(bps))
    }

    fn standard() -> TierTable {
        TierTable::new(vec![tier(12, 1407), tier(48, 2950)])
    }

    #[test]
    fn test_resolve_below_lowest_threshold() {
        let table = standard();
        assert!(table.resolve(0).is_none());
        assert!(table.resolve(1).is_none());
        assert!(table.resolve(11).is_none());
        assert!(table.resolve(-5).is_none());
    }

    #[test]
    fn test_resolve_at_and_between_thresholds() {
        let table = standard();
        assert_eq!(table.resolve(12), Some(&tier(12, 1407)));
        assert_eq!(table.resolve(47), Some(&tier(12, 1407)));
        assert_eq!(table.resolve(48), Some(&tier(48, 2950)));
        assert_eq!(table.resolve(i64::MAX), Some(&tier(48, 2950)));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let forward = TierTable::new(vec![tier(12, 1407), tier(24, 2000), tier(48, 2950)]);
        let shuffled = TierTable::new(vec![tier(48, 2950), tier(12, 1407), tier(24, 2000)]);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_duplicate_threshold_keeps_last() {
        let (table, dups) = TierTable::normalize(vec![
            tier(12, 1407),
            tier(48, 2950),
            tier(12, 1500),
            tier(12, 1600),
        ]);
        assert_eq!(dups, vec![12]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(12).unwrap().discount_percent.bps(), 1600);
    }

    #[test]
    fn test_rate_for() {
        let table = standard();
        assert_eq!(table.rate_for(6), DiscountRate::zero());
        assert_eq!(table.rate_for(30).bps(), 1407);
    }

    #[test]
    fn test_empty_table() {
        let table = TierTable::default();
        assert!(table.is_empty());
        assert!(table.resolve(100).is_none());
        assert_eq!(table.len(), 0);
    }

    proptest! {
        #[test]
        fn resolve_is_monotonic(
            thresholds in proptest::collection::vec(1i64..500, 0..8),
            q1 in -10i64..600,
            step in 0i64..600,
        ) {
            let table = TierTable::new(
                thresholds.iter().map(|&m| tier(m, (m as u32 * 7) % 9999)).collect(),
            );
            let q2 = q1 + step;
            let t1 = table.resolve(q1).map(|t| t.min_quantity);
            let t2 = table.resolve(q2).map(|t| t.min_quantity);
            prop_assert!(t1 <= t2);
        }

        #[test]
        fn resolved_tier_is_highest_met(
            thresholds in proptest::collection::vec(1i64..500, 1..8),
            q in 1i64..600,
        ) {
            let table = TierTable::new(
                thresholds.iter().map(|&m| tier(m, 100)).collect(),
            );
            let expected = thresholds.iter().copied().filter(|&m| m <= q).max();
            prop_assert_eq!(table.resolve(q).map(|t| t.min_quantity), expected);
        }
    }
}
