//! # Domain Types
//!
//! Core domain types shared by the classifier, resolver, calculator and engine.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │      Tier       │   │    Segment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  min_quantity   │   │  TierA          │       │
//! │  │  1407 = 14.07%  │   │  discount_pct   │   │  TierB          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   BuyerInfo     │   │    CartLine     │   │ DiscountRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  relationship?  │   │  id, quantity   │   │  line_id        │       │
//! │  │   └─ labels     │   │  eligible       │   │  label          │       │
//! │  │                 │   │  list/current $ │   │  percent "17.96"│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input/output records use camelCase JSON and export TypeScript bindings
//! for the JavaScript host.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// A discount percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Discount percentages are specified and
/// emitted with at most two fraction digits, so bps hold them exactly:
/// 1407 bps = 14.07%.
///
/// ## Wire Format
/// Serializes as a decimal string with up to 2 fraction digits and trailing
/// zeros trimmed (`"14.07"`, `"29.5"`, `"15"`). Deserializes from either a
/// string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// The largest representable discount: 99.99%.
    pub const MAX: DiscountRate = DiscountRate(9999);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage, rounded to the nearest basis point.
    ///
    /// Returns `None` for NaN, infinite, negative, or ≥ 100% values. Values
    /// just under 100% that would round up to it become [`DiscountRate::MAX`].
    ///
    /// ## Example
    /// ```rust
    /// use tierwise_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_percentage(14.07).unwrap().bps(), 1407);
    /// assert!(DiscountRate::from_percentage(100.0).is_none());
    /// assert!(DiscountRate::from_percentage(f64::NAN).is_none());
    /// ```
    pub fn from_percentage(pct: f64) -> Option<Self> {
        if !pct.is_finite() || pct < 0.0 || pct >= 100.0 {
            return None;
        }
        let bps = (pct * 100.0).round() as u32;
        Some(DiscountRate(bps.min(Self::MAX.0)))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display and tests only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}", whole, frac)
        }
    }
}

impl Serialize for DiscountRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiscountRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        let pct = match Repr::deserialize(deserializer)? {
            Repr::Number(n) => n,
            Repr::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid percentage '{}'", s)))?,
        };
        DiscountRate::from_percentage(pct)
            .ok_or_else(|| serde::de::Error::custom(format!("percentage {} out of range", pct)))
    }
}

// =============================================================================
// Segment
// =============================================================================

/// The buyer classification that selects a tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Segment {
    /// Wholesale tier A (~22% base discount).
    #[serde(rename = "A")]
    TierA,
    /// Wholesale tier B (~45% base discount).
    #[serde(rename = "B")]
    TierB,
}

impl Segment {
    /// All segments, in classifier precedence order (B before A).
    pub const ALL: [Segment; 2] = [Segment::TierB, Segment::TierA];

    /// The canonical configuration key.
    pub const fn key(&self) -> &'static str {
        match self {
            Segment::TierA => "A",
            Segment::TierB => "B",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Parses configuration keys such as `A`, `tier-b`, `Wholesale_Tier_A`.
impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let tail = normalized
            .strip_prefix("wholesale")
            .unwrap_or(normalized.as_str());
        let tail = tail.strip_prefix("tier").unwrap_or(tail);

        match tail {
            "a" => Ok(Segment::TierA),
            "b" => Ok(Segment::TierB),
            _ => Err(format!("unknown segment '{}'", s)),
        }
    }
}

// =============================================================================
// Tier
// =============================================================================

/// A (quantity threshold, discount) pair.
///
/// In the percent-differential model `discount_percent` is the discount off
/// full price; in the price-anchored model the same value is read as the
/// target percent off list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tier {
    /// Smallest quantity that reaches this tier (always > 0).
    #[ts(type = "number")]
    pub min_quantity: i64,

    /// Discount granted at this tier.
    #[ts(type = "string")]
    pub discount_percent: DiscountRate,
}

impl Tier {
    pub const fn new(min_quantity: i64, discount_percent: DiscountRate) -> Self {
        Tier {
            min_quantity,
            discount_percent,
        }
    }
}

// =============================================================================
// Buyer
// =============================================================================

/// Buyer identity as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BuyerInfo {
    /// Present only for B2B buyers (a purchasing company relationship).
    #[serde(default)]
    pub relationship: Option<PurchasingRelationship>,
}

/// The buyer's purchasing relationship (company location, catalogs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchasingRelationship {
    /// Human-readable catalog or price-list titles, e.g. `"Wholesale Tier B"`.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl BuyerInfo {
    /// A direct-to-consumer buyer.
    pub fn consumer() -> Self {
        BuyerInfo::default()
    }

    /// A B2B buyer whose relationship carries the given labels.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BuyerInfo {
            relationship: Some(PurchasingRelationship {
                labels: labels.into_iter().map(Into::into).collect(),
            }),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart snapshot.
///
/// Prices arrive as decimal major units from the host and are converted to
/// [`Money`] on access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub id: String,

    #[ts(type = "number")]
    pub quantity: i64,

    /// True iff the line's product carries the qualifying tag.
    #[serde(default)]
    pub eligible: bool,

    /// Authoritative list price per unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_list_price: Option<f64>,

    /// Price per unit the buyer currently pays (after base discounts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_current_price: Option<f64>,
}

impl CartLine {
    /// An eligible line without price metadata.
    pub fn eligible(id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            id: id.into(),
            quantity,
            eligible: true,
            unit_list_price: None,
            unit_current_price: None,
        }
    }

    /// A line whose product lacks the qualifying tag.
    pub fn ineligible(id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            eligible: false,
            ..CartLine::eligible(id, quantity)
        }
    }

    /// Attaches list and current unit prices.
    pub fn with_prices(mut self, list: f64, current: f64) -> Self {
        self.unit_list_price = Some(list);
        self.unit_current_price = Some(current);
        self
    }

    /// Both unit prices as money, when both are present and positive.
    ///
    /// Returns `(current, list)`.
    pub fn prices(&self) -> Option<(Money, Money)> {
        let list = self.unit_list_price.and_then(Money::from_decimal)?;
        let current = self.unit_current_price.and_then(Money::from_decimal)?;
        if list.is_positive() && current.is_positive() {
            Some((current, list))
        } else {
            None
        }
    }
}

// =============================================================================
// Discount Record
// =============================================================================

/// A discount directive for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountRecord {
    pub line_id: String,

    /// Human-readable message, includes the aggregate quantity.
    pub label: String,

    /// Percent off the line's current price, always in (0, 100).
    #[ts(type = "string")]
    pub percent: DiscountRate,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_percentage() {
        assert_eq!(DiscountRate::from_percentage(14.07).unwrap().bps(), 1407);
        assert_eq!(DiscountRate::from_percentage(29.5).unwrap().bps(), 2950);
        assert_eq!(DiscountRate::from_percentage(0.0).unwrap().bps(), 0);
        assert_eq!(DiscountRate::from_percentage(99.99).unwrap().bps(), 9999);
    }

    #[test]
    fn test_discount_rate_just_under_hundred_clamps() {
        assert_eq!(DiscountRate::from_percentage(99.995), Some(DiscountRate::MAX));
        assert_eq!(DiscountRate::from_percentage(99.999), Some(DiscountRate::MAX));
    }

    #[test]
    fn test_discount_rate_rejects_out_of_range() {
        assert!(DiscountRate::from_percentage(-1.0).is_none());
        assert!(DiscountRate::from_percentage(100.0).is_none());
        assert!(DiscountRate::from_percentage(f64::NAN).is_none());
        assert!(DiscountRate::from_percentage(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn test_discount_rate_display_trims_zeros() {
        assert_eq!(DiscountRate::from_bps(1407).to_string(), "14.07");
        assert_eq!(DiscountRate::from_bps(2950).to_string(), "29.5");
        assert_eq!(DiscountRate::from_bps(1500).to_string(), "15");
        assert_eq!(DiscountRate::from_bps(5).to_string(), "0.05");
        assert_eq!(DiscountRate::zero().to_string(), "0");
    }

    #[test]
    fn test_discount_rate_serde() {
        let json = serde_json::to_string(&DiscountRate::from_bps(1796)).unwrap();
        assert_eq!(json, "\"17.96\"");

        let from_str: DiscountRate = serde_json::from_str("\"17.96\"").unwrap();
        let from_num: DiscountRate = serde_json::from_str("17.96").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<DiscountRate>("\"abc\"").is_err());
        assert!(serde_json::from_str::<DiscountRate>("120").is_err());
    }

    #[test]
    fn test_segment_from_str() {
        assert_eq!("A".parse::<Segment>().unwrap(), Segment::TierA);
        assert_eq!("b".parse::<Segment>().unwrap(), Segment::TierB);
        assert_eq!("tier-a".parse::<Segment>().unwrap(), Segment::TierA);
        assert_eq!("tier_b".parse::<Segment>().unwrap(), Segment::TierB);
        assert_eq!("Wholesale-Tier-B".parse::<Segment>().unwrap(), Segment::TierB);
        assert!("retail".parse::<Segment>().is_err());
        assert!("tier-c".parse::<Segment>().is_err());
    }

    #[test]
    fn test_segment_serde_uses_keys() {
        assert_eq!(serde_json::to_string(&Segment::TierB).unwrap(), "\"B\"");
    }

    #[test]
    fn test_cart_line_prices() {
        let line = CartLine::eligible("gid://line/1", 3).with_prices(20.0, 15.6);
        let (current, list) = line.prices().unwrap();
        assert_eq!(current, Money::from_cents(1560));
        assert_eq!(list, Money::from_cents(2000));

        // Sub-cent unit prices keep their precision.
        let bulk = CartLine::eligible("l", 1).with_prices(0.10, 0.078);
        assert_eq!(
            bulk.prices(),
            Some((Money::from_micros(78_000), Money::from_micros(100_000)))
        );
        let tiny = CartLine::eligible("l", 1).with_prices(0.004, 0.003);
        assert_eq!(tiny.prices().unwrap().0.micros(), 3_000);

        assert!(CartLine::eligible("l", 1).prices().is_none());
        assert!(CartLine::eligible("l", 1).with_prices(0.0, 5.0).prices().is_none());
        assert!(CartLine::eligible("l", 1).with_prices(f64::NAN, 5.0).prices().is_none());
    }

    #[test]
    fn test_cart_line_deserializes_camel_case() {
        let line: CartLine = serde_json::from_str(
            r#"{"id":"l1","quantity":4,"eligible":true,"unitListPrice":10.0,"unitCurrentPrice":7.8}"#,
        )
        .unwrap();
        assert_eq!(line.quantity, 4);
        assert!(line.eligible);
        assert_eq!(line.prices().unwrap().0, Money::from_cents(780));
    }
}
