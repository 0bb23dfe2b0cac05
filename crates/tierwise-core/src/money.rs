//! # Money Module
//!
//! Provides the `Money` type used for unit prices in the price-anchored model.
//!
//! ## Why Fixed-Point Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Host platforms hand us unit prices as decimal numbers:                 │
//! │    listPrice = 19.99, currentPrice = 15.59, or 0.078 for bulk parts     │
//! │                                                                         │
//! │  Ratios and target prices computed in f64 drift:                        │
//! │    19.99 × 0.78 = 15.592199999999998                                    │
//! │                                                                         │
//! │  Whole cents are too coarse for sub-cent unit prices:                   │
//! │    0.078 → 8¢ turns a 9.62% adjustment into 11.88%                      │
//! │                                                                         │
//! │  OUR SOLUTION: convert ONCE at the boundary to micro-units (10⁻⁶),      │
//! │  then integer math with i128 intermediates                              │
//! │    19_990_000 × 7800  (micro-units × basis points, exact)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tierwise_core::money::Money;
//!
//! let list = Money::from_cents(1999);
//! let current = Money::from_decimal(0.078).unwrap();
//!
//! assert_eq!(list.micros(), 19_990_000);
//! assert_eq!(current.micros(), 78_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Micro-units per major currency unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

const MICROS_PER_CENT: i64 = MICROS_PER_UNIT / 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in millionths of the major currency unit.
///
/// ## Where Money is Used
/// ```text
/// CartLine.unit_list_price ────┐
///                              ├──► Money ──► RatioBand::contains()  ──► PriceRatioClassifier
/// CartLine.unit_current_price ─┘          └─► price_anchored_rate() ──► DiscountRate
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from micro-units.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Money(micros)
    }

    /// Creates a Money value from whole cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents * MICROS_PER_CENT)
    }

    /// Converts a decimal amount in major units (e.g. `12.50`) to
    /// micro-units, rounded to the nearest one.
    ///
    /// This is the ONLY place a float becomes money. Returns `None` for
    /// NaN, infinite or out-of-range amounts.
    ///
    /// ## Example
    /// ```rust
    /// use tierwise_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.99).unwrap(), Money::from_cents(1099));
    /// assert_eq!(Money::from_decimal(0.0045).unwrap().micros(), 4500);
    /// assert!(Money::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let micros = (amount * MICROS_PER_UNIT as f64).round();
        if micros.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        Some(Money(micros as i64))
    }

    /// Returns the value in micro-units.
    #[inline]
    pub const fn micros(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

/// Debug-style display: at least two fraction digits, e.g. `$10.99`, `$0.078`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let units = (self.0 / MICROS_PER_UNIT).abs();
        let fraction = format!("{:06}", (self.0 % MICROS_PER_UNIT).abs());
        let fraction = fraction.trim_end_matches('0');
        write!(f, "{}${}.{:0<2}", sign, units, fraction)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
