//! # Discount Calculator
//!
//! Computes the ADDITIONAL discount a line needs to reach a target tier.
//!
//! ## Why Multiplicative?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A line already at 14.07% off must end up at 29.5% off.                 │
//! │                                                                         │
//! │  Additive (WRONG):    29.5 − 14.07 = 15.43%                             │
//! │     $100 → $85.93 → $72.67      ❌ target is $70.50                     │
//! │                                                                         │
//! │  Multiplicative:      1 − 0.705 / 0.8593 = 17.96%                       │
//! │     $100 → $85.93 → $70.50      ✅                                      │
//! │                                                                         │
//! │  Discounts compose as price RETENTION factors, not as percentages.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementation
//! All math is integer math on basis points and money micro-units with i128
//! intermediates, rounded half-up to the nearest basis point (0.01%).
//! Results are always in `[0, 100)`; inputs that would produce a negative
//! or undefined result yield zero.

use crate::money::Money;
use crate::types::DiscountRate;

const BPS: i128 = 10_000;

/// `num / den` rounded half-up. Requires `num >= 0`, `den > 0`.
#[inline]
fn div_round_half_up(num: i128, den: i128) -> i128 {
    (2 * num + den) / (2 * den)
}

#[inline]
fn clamp_rate(bps: i128) -> DiscountRate {
    DiscountRate::from_bps(bps.clamp(0, DiscountRate::MAX.bps() as i128) as u32)
}

// =============================================================================
// Percent-Differential Model
// =============================================================================

/// Additional discount to apply on top of `per_line` so that the line's net
/// price equals a single `aggregate` discount.
///
/// ## Rules
/// - `aggregate <= per_line` → zero (never a reducing adjustment)
/// - `per_line == 0` → `aggregate` unchanged
/// - otherwise `1 − (1 − aggregate) / (1 − per_line)`
///
/// ## Example
/// ```rust
/// use tierwise_core::calculator::differential_rate;
/// use tierwise_core::types::DiscountRate;
///
/// let extra = differential_rate(DiscountRate::from_bps(2950), DiscountRate::from_bps(1407));
/// assert_eq!(extra.to_string(), "17.96");
/// ```
pub fn differential_rate(aggregate: DiscountRate, per_line: DiscountRate) -> DiscountRate {
    let aggregate = aggregate.min(DiscountRate::MAX);
    let per_line = per_line.min(DiscountRate::MAX);

    if aggregate <= per_line {
        return DiscountRate::zero();
    }
    if per_line.is_zero() {
        return aggregate;
    }

    let retained_now = BPS - per_line.bps() as i128;
    let retained_target = BPS - aggregate.bps() as i128;
    // (1 − target/now) in bps = (now − target) × 10000 / now
    let extra = div_round_half_up((retained_now - retained_target) * BPS, retained_now);
    clamp_rate(extra)
}

// =============================================================================
// Price-Anchored Model
// =============================================================================

/// Discount off the CURRENT price needed to bring it down to
/// `list × (1 − target)`.
///
/// ## Rules
/// - non-positive prices → zero
/// - `current <= target price` → zero
/// - otherwise `(current − target price) / current`
///
/// ## Example
/// ```rust
/// use tierwise_core::calculator::price_anchored_rate;
/// use tierwise_core::money::Money;
/// use tierwise_core::types::DiscountRate;
///
/// // List $100, buyer pays $78 (22% base), volume tier targets 30% off list.
/// let extra = price_anchored_rate(
///     Money::from_cents(7800),
///     Money::from_cents(10000),
///     DiscountRate::from_bps(3000),
/// );
/// // $78 → $70 is 10.26% off the current price (not 8% off list).
/// assert_eq!(extra.to_string(), "10.26");
/// ```
pub fn price_anchored_rate(current: Money, list: Money, target: DiscountRate) -> DiscountRate {
    if !current.is_positive() || !list.is_positive() {
        return DiscountRate::zero();
    }
    let target = target.min(DiscountRate::MAX);

    // Both sides scaled to micro-units × bps so the target price stays exact.
    let current_scaled = current.micros() as i128 * BPS;
    let target_scaled = list.micros() as i128 * (BPS - target.bps() as i128);

    if current_scaled <= target_scaled {
        return DiscountRate::zero();
    }
    let extra = div_round_half_up((current_scaled - target_scaled) * BPS, current_scaled);
    clamp_rate(extra)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rate(bps: u32) -> DiscountRate {
        DiscountRate::from_bps(bps)
    }

    #[test]
    fn test_differential_zero_when_already_at_target() {
        assert_eq!(differential_rate(rate(1407), rate(1407)), DiscountRate::zero());
        assert_eq!(differential_rate(rate(1407), rate(2950)), DiscountRate::zero());
        assert_eq!(differential_rate(rate(0), rate(0)), DiscountRate::zero());
    }

    #[test]
    fn test_differential_full_price_line_gets_whole_tier() {
        assert_eq!(differential_rate(rate(1407), DiscountRate::zero()), rate(1407));
        assert_eq!(differential_rate(rate(2950), DiscountRate::zero()), rate(2950));
    }

    #[test]
    fn test_differential_is_multiplicative_not_additive() {
        let extra = differential_rate(rate(2950), rate(1407));
        assert_eq!(extra, rate(1796));
        assert_ne!(extra, rate(2950 - 1407));
    }

    #[test]
    fn test_differential_rounds_half_up() {
        // 1 − 0.8 / 0.9 = 0.11111 → 11.11%
        assert_eq!(differential_rate(rate(2000), rate(1000)), rate(1111));
        // 1 − 0.5 / 0.6 = 0.16667 → 16.67%
        assert_eq!(differential_rate(rate(5000), rate(4000)), rate(1667));
    }

    #[test]
    fn test_differential_clamps_out_of_range_inputs() {
        let extra = differential_rate(rate(50_000), rate(1000));
        assert!(extra < rate(10_000));
        assert_eq!(differential_rate(rate(9999), rate(9998)).bps(), 5000);
    }

    #[test]
    fn test_price_anchored_zero_when_at_or_below_target() {
        let list = Money::from_cents(10000);
        assert!(price_anchored_rate(Money::from_cents(7000), list, rate(3000)).is_zero());
        assert!(price_anchored_rate(Money::from_cents(6500), list, rate(3000)).is_zero());
    }

    #[test]
    fn test_price_anchored_is_relative_to_current_price() {
        let extra = price_anchored_rate(
            Money::from_cents(7800),
            Money::from_cents(10000),
            rate(3000),
        );
        // (78 − 70) / 78 = 0.102564 → 10.26%
        assert_eq!(extra, rate(1026));
        // Not the percent-off-list difference.
        assert_ne!(extra, rate(800));
    }

    #[test]
    fn test_price_anchored_full_price_line() {
        let list = Money::from_cents(2499);
        assert_eq!(price_anchored_rate(list, list, rate(1407)), rate(1407));
    }

    #[test]
    fn test_price_anchored_sub_cent_prices() {
        // List $0.10, buyer pays $0.078, tier targets 29.5% off list ($0.0705).
        let extra = price_anchored_rate(
            Money::from_micros(78_000),
            Money::from_micros(100_000),
            rate(2950),
        );
        // (0.078 − 0.0705) / 0.078 = 9.615% → 9.62, same as the $10 / $7.80 line
        assert_eq!(extra, rate(962));
        assert_eq!(
            extra,
            price_anchored_rate(Money::from_cents(780), Money::from_cents(1000), rate(2950))
        );
    }

    #[test]
    fn test_price_anchored_invalid_prices_yield_zero() {
        let list = Money::from_cents(10000);
        assert!(price_anchored_rate(Money::zero(), list, rate(3000)).is_zero());
        assert!(price_anchored_rate(Money::from_cents(-500), list, rate(3000)).is_zero());
        assert!(price_anchored_rate(Money::from_cents(9000), Money::zero(), rate(3000)).is_zero());
    }

    #[test]
    fn test_price_anchored_never_reaches_hundred_percent() {
        let extra = price_anchored_rate(
            Money::from_cents(100_000_000),
            Money::from_cents(1),
            rate(9999),
        );
        assert_eq!(extra, DiscountRate::MAX);
    }

    proptest! {
        #[test]
        fn differential_composes_to_aggregate(
            per_line in 0u32..9999,
            gap in 0u32..9999,
        ) {
            let aggregate = (per_line + gap).min(9999);
            let extra = differential_rate(rate(aggregate), rate(per_line));

            let price = 100.0_f64;
            let sequential = price
                * (1.0 - per_line as f64 / 10_000.0)
                * (1.0 - extra.bps() as f64 / 10_000.0);
            let direct = price * (1.0 - aggregate as f64 / 10_000.0);
            prop_assert!((sequential - direct).abs() <= 0.01,
                "per_line={} aggregate={} extra={} seq={} direct={}",
                per_line, aggregate, extra.bps(), sequential, direct);
        }

        #[test]
        fn differential_in_range(aggregate in 0u32..20_000, per_line in 0u32..20_000) {
            let extra = differential_rate(rate(aggregate), rate(per_line));
            prop_assert!(extra.bps() < 10_000);
            if aggregate <= per_line {
                prop_assert!(extra.is_zero());
            }
        }

        #[test]
        fn price_anchored_reaches_target_price(
            list_micros in 1_000i64..1_000_000_000,
            current_pct in 1u32..=10_000,
            target in 0u32..9999,
        ) {
            let list = Money::from_micros(list_micros);
            let current = Money::from_micros((list_micros * current_pct as i64 / 10_000).max(1));
            let extra = price_anchored_rate(current, list, rate(target));
            prop_assert!(extra.bps() < 10_000);

            let current_f = current.micros() as f64;
            let target_price = list_micros as f64 * (1.0 - target as f64 / 10_000.0);
            let net = current_f * (1.0 - extra.bps() as f64 / 10_000.0);
            if extra.is_zero() {
                prop_assert!(current_f <= target_price + current_f * 0.00005);
            } else {
                // Rounding to 0.01% of the current price.
                prop_assert!((net - target_price).abs() <= current_f * 0.00005 + 1e-6);
            }
        }
    }
}
