//! # Segment Classification
//!
//! Decides which tier table governs a buyer. Two independent strategies sit
//! behind [`SegmentClassifier`]; a deployment picks exactly one.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  IdentityClassifier                 PriceRatioClassifier                │
//! │  ──────────────────                 ────────────────────                │
//! │  buyer.relationship.labels          sample line: current / list         │
//! │                                                                         │
//! │  no relationship   → None           ratio 0.73 – 0.83 → A (~22% base)  │
//! │  "…tier b…"        → B              ratio 0.50 – 0.60 → B (~45% base)  │
//! │  "…tier a…"        → A              anything else     → None (DTC)     │
//! │  anything else     → A              no priced sample  → None           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::config::TierConfig;
use crate::money::Money;
use crate::types::{BuyerInfo, CartLine, DiscountRate, Segment};

/// Determines a buyer's segment. Implementations are pure.
pub trait SegmentClassifier: Send + Sync {
    /// Classifies the buyer.
    ///
    /// `sample` is the first eligible line carrying both unit prices, if
    /// any. `config` is the active tier configuration.
    fn classify(
        &self,
        buyer: &BuyerInfo,
        sample: Option<&CartLine>,
        config: &TierConfig,
    ) -> Option<Segment>;
}

impl<T: SegmentClassifier + ?Sized> SegmentClassifier for Box<T> {
    fn classify(
        &self,
        buyer: &BuyerInfo,
        sample: Option<&CartLine>,
        config: &TierConfig,
    ) -> Option<Segment> {
        (**self).classify(buyer, sample, config)
    }
}

// =============================================================================
// Identity-Based
// =============================================================================

/// Matches the buyer's catalog labels against segment keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClassifier {
    /// Checked in order; the first segment with a matching keyword wins.
    keywords: Vec<(Segment, Vec<String>)>,
    /// Segment for B2B buyers whose labels match nothing.
    fallback: Segment,
}

impl Default for IdentityClassifier {
    fn default() -> Self {
        IdentityClassifier::new(vec![
            (Segment::TierB, vec!["tier b".to_string()]),
            (Segment::TierA, vec!["tier a".to_string()]),
        ])
    }
}

impl IdentityClassifier {
    /// Keywords are matched case-insensitively, with `-` and `_` treated as
    /// spaces, in the order given.
    pub fn new(keywords: Vec<(Segment, Vec<String>)>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|(segment, words)| (segment, words.iter().map(|w| normalize(w)).collect()))
            .collect();
        IdentityClassifier {
            keywords,
            fallback: Segment::TierA,
        }
    }

    fn match_labels(&self, labels: &[String]) -> Option<Segment> {
        let labels: Vec<String> = labels.iter().map(|l| normalize(l)).collect();
        self.keywords.iter().find_map(|(segment, words)| {
            words
                .iter()
                .any(|w| labels.iter().any(|l| l.contains(w.as_str())))
                .then_some(*segment)
        })
    }
}

impl SegmentClassifier for IdentityClassifier {
    fn classify(
        &self,
        buyer: &BuyerInfo,
        _sample: Option<&CartLine>,
        _config: &TierConfig,
    ) -> Option<Segment> {
        let relationship = buyer.relationship.as_ref()?;
        let segment = self
            .match_labels(&relationship.labels)
            .unwrap_or(self.fallback);
        debug!(%segment, labels = ?relationship.labels, "classified buyer by identity");
        Some(segment)
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect()
}

// =============================================================================
// Price-Ratio-Based
// =============================================================================

const BPS: i128 = 10_000;

/// An inclusive band of current/list price ratios, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioBand {
    pub segment: Segment,
    pub min_bps: u32,
    pub max_bps: u32,
}

impl RatioBand {
    pub const fn new(segment: Segment, min_bps: u32, max_bps: u32) -> Self {
        RatioBand {
            segment,
            min_bps,
            max_bps,
        }
    }

    /// The band centred on a base discount: base 22%, tolerance 5 points →
    /// ratios 0.73 – 0.83.
    pub fn around_base(segment: Segment, base: DiscountRate, tolerance: DiscountRate) -> Self {
        let center = 10_000 - base.bps();
        RatioBand {
            segment,
            min_bps: center.saturating_sub(tolerance.bps()),
            max_bps: (center + tolerance.bps()).min(10_000),
        }
    }

    /// Whether `current / list` lies inside the band, compared exactly
    /// (no rounded ratio). Non-positive prices never match.
    pub fn contains(&self, current: Money, list: Money) -> bool {
        if !current.is_positive() || !list.is_positive() {
            return false;
        }
        let scaled = current.micros() as i128 * BPS;
        let list = list.micros() as i128;
        scaled >= list * self.min_bps as i128 && scaled <= list * self.max_bps as i128
    }
}

/// Infers the segment from how far the current price sits below list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRatioClassifier {
    bands: Vec<RatioBand>,
    /// When set, segments with a configured `basePercent` get a band of
    /// this half-width around it instead of their fixed band.
    base_tolerance: Option<DiscountRate>,
}

impl Default for PriceRatioClassifier {
    fn default() -> Self {
        PriceRatioClassifier::with_bands(vec![
            RatioBand::new(Segment::TierA, 7300, 8300),
            RatioBand::new(Segment::TierB, 5000, 6000),
        ])
    }
}

impl PriceRatioClassifier {
    /// Fixed bands, checked in order.
    pub fn with_bands(bands: Vec<RatioBand>) -> Self {
        PriceRatioClassifier {
            bands,
            base_tolerance: None,
        }
    }

    /// Derive bands from each segment's `basePercent` (± `tolerance`),
    /// keeping the fixed band for segments without one.
    pub fn derive_from_base(mut self, tolerance: DiscountRate) -> Self {
        self.base_tolerance = Some(tolerance);
        self
    }

    fn effective_bands(&self, config: &TierConfig) -> Vec<RatioBand> {
        let Some(tolerance) = self.base_tolerance else {
            return self.bands.clone();
        };
        let mut bands: Vec<RatioBand> = config
            .segments()
            .filter_map(|(segment, pricing)| {
                pricing
                    .base_percent
                    .map(|base| RatioBand::around_base(segment, base, tolerance))
            })
            .collect();
        let fixed: Vec<RatioBand> = self
            .bands
            .iter()
            .filter(|fixed| bands.iter().all(|b| b.segment != fixed.segment))
            .copied()
            .collect();
        bands.extend(fixed);
        bands
    }
}

impl SegmentClassifier for PriceRatioClassifier {
    fn classify(
        &self,
        _buyer: &BuyerInfo,
        sample: Option<&CartLine>,
        config: &TierConfig,
    ) -> Option<Segment> {
        let (current, list) = sample?.prices()?;
        let segment = self
            .effective_bands(config)
            .iter()
            .find(|band| band.contains(current, list))
            .map(|band| band.segment);
        debug!(%current, %list, segment = ?segment, "classified buyer by price ratio");
        segment
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
