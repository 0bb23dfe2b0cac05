//! # Aggregation Engine
//!
//! Orchestrates one evaluation over an immutable cart snapshot.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LoadConfig ──► ClassifySegment ──► ScanLines ──► ResolveAggregateTier  │
//! │                       │                 │                 │             │
//! │                 no segment?       no eligible?      below lowest?       │
//! │                       │                 │                 │             │
//! │                       ▼                 ▼                 ▼             │
//! │                 (no table for segment?)                                 │
//! │                       └──────────► empty discount list ◄──┘             │
//! │                                                                         │
//! │  ResolveAggregateTier ──► ComputePerLine ──► Emit (only results > 0)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Line Step
//! Percent-differential model: each line's standalone tier (from its OWN
//! quantity) is the baseline; the line receives
//! `differential_rate(aggregate tier, standalone tier)`.
//!
//! Price-anchored model: the line's current price already reflects whatever
//! it earns alone; the line receives `price_anchored_rate(current, list,
//! aggregate tier)`.
//!
//! The engine holds no mutable state. One `Engine` may serve any number of
//! concurrent evaluations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use ts_rs::TS;

use crate::calculator::{differential_rate, price_anchored_rate};
use crate::classifier::SegmentClassifier;
use crate::config::TierConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::money::Money;
use crate::types::{BuyerInfo, CartLine, DiscountRate, DiscountRecord, Segment, Tier};
use crate::validation::validate_quantity;

// =============================================================================
// Settings
// =============================================================================

/// Which accounting model computes the per-line discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// Tier percents off full price; lines get the multiplicative delta.
    #[default]
    PercentDifferential,
    /// Tier percents are targets off list price; lines need both prices.
    PriceAnchored,
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingModel::PercentDifferential => write!(f, "percent"),
            PricingModel::PriceAnchored => write!(f, "price"),
        }
    }
}

impl FromStr for PricingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" | "percent_differential" | "percent-differential" => {
                Ok(PricingModel::PercentDifferential)
            }
            "price" | "price_anchored" | "price-anchored" => Ok(PricingModel::PriceAnchored),
            other => Err(format!("unknown pricing model '{}'", other)),
        }
    }
}

/// Per-deployment engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub model: PricingModel,

    /// Leading text of every discount label.
    pub label_title: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            model: PricingModel::PercentDifferential,
            label_title: "Wholesale volume pricing".to_string(),
        }
    }
}

// =============================================================================
// Input / Output Records
// =============================================================================

/// Everything one evaluation needs, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EvaluationInput {
    #[serde(default)]
    pub buyer: BuyerInfo,

    #[serde(default)]
    pub lines: Vec<CartLine>,

    /// Tier document: a JSON object, a JSON string holding one, or absent.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub config: Option<Value>,
}

/// How an evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum EvaluationStatus {
    /// All states ran; `discounts` may still be empty.
    Evaluated,
    /// Buyer has no segment.
    NoSegment,
    /// No tier table for the buyer's segment.
    NoTierTable,
    /// No eligible line survived the scan.
    NoEligibleLines,
    /// Aggregate quantity is below the lowest threshold.
    BelowLowestTier,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Evaluation {
    pub status: EvaluationStatus,

    /// At most one per eligible line, in cart order.
    pub discounts: Vec<DiscountRecord>,

    pub diagnostics: Vec<Diagnostic>,

    pub segment: Option<Segment>,

    #[ts(type = "number")]
    pub aggregate_quantity: i64,

    pub aggregate_tier: Option<Tier>,
}

/// The payload handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountOutput {
    pub discounts: Vec<DiscountRecord>,
}

impl From<Evaluation> for DiscountOutput {
    fn from(evaluation: Evaluation) -> Self {
        DiscountOutput {
            discounts: evaluation.discounts,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A line that passed the scan.
struct ScannedLine<'a> {
    id: &'a str,
    quantity: i64,
    prices: Option<(Money, Money)>,
}

/// Stateless evaluator combining one classifier strategy with settings.
#[derive(Debug, Clone)]
pub struct Engine<C> {
    classifier: C,
    settings: EngineSettings,
}

impl<C: SegmentClassifier> Engine<C> {
    pub fn new(classifier: C, settings: EngineSettings) -> Self {
        Engine {
            classifier,
            settings,
        }
    }

    /// Runs one evaluation. Never fails; problems become diagnostics.
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tierwise_core::{CartLine, BuyerInfo, Engine, EngineSettings, EvaluationInput};
    /// use tierwise_core::classifier::IdentityClassifier;
    ///
    /// let engine = Engine::new(IdentityClassifier::default(), EngineSettings::default());
    /// let input = EvaluationInput {
    ///     buyer: BuyerInfo::with_labels(["Wholesale Tier A"]),
    ///     lines: vec![CartLine::eligible("l1", 6), CartLine::eligible("l2", 6)],
    ///     config: Some(json!({ "A": { "tiers": [
    ///         { "minQuantity": 12, "discountPercent": 14.07 },
    ///         { "minQuantity": 48, "discountPercent": 29.5 }
    ///     ] } })),
    /// };
    ///
    /// let result = engine.evaluate(&input);
    /// assert_eq!(result.discounts.len(), 2);
    /// assert_eq!(result.discounts[0].percent.to_string(), "14.07");
    /// ```
    #[instrument(skip_all, fields(lines = input.lines.len(), model = %self.settings.model))]
    pub fn evaluate(&self, input: &EvaluationInput) -> Evaluation {
        let mut diagnostics = Diagnostics::new();

        // LoadConfig
        let loaded = TierConfig::load(input.config.as_ref(), &mut diagnostics);
        let config = &loaded.config;

        // ClassifySegment
        // Only a line the scan will count may classify the buyer.
        let sample = input.lines.iter().find(|line| {
            line.eligible && validate_quantity(line.quantity).is_ok() && line.prices().is_some()
        });
        let Some(segment) = self.classifier.classify(&input.buyer, sample, config) else {
            debug!("buyer has no segment");
            return finish(EvaluationStatus::NoSegment, None, diagnostics);
        };
        let Some(table) = config.table(segment) else {
            debug!(%segment, "no tier table for segment");
            return finish(EvaluationStatus::NoTierTable, Some(segment), diagnostics);
        };

        // ScanLines
        let scanned = self.scan(&input.lines, &mut diagnostics);
        if scanned.is_empty() {
            debug!(%segment, "no eligible lines");
            return finish(EvaluationStatus::NoEligibleLines, Some(segment), diagnostics);
        }
        let aggregate_quantity = scanned
            .iter()
            .fold(0i64, |sum, line| sum.saturating_add(line.quantity));

        // ResolveAggregateTier
        let Some(aggregate_tier) = table.resolve(aggregate_quantity).copied() else {
            debug!(%segment, aggregate_quantity, "aggregate below lowest tier");
            let mut evaluation =
                finish(EvaluationStatus::BelowLowestTier, Some(segment), diagnostics);
            evaluation.aggregate_quantity = aggregate_quantity;
            return evaluation;
        };
        debug!(
            %segment,
            aggregate_quantity,
            tier_min = aggregate_tier.min_quantity,
            tier_percent = %aggregate_tier.discount_percent,
            "resolved aggregate tier"
        );

        // ComputePerLine + Emit
        let label = format!("{} ({} units)", self.settings.label_title, aggregate_quantity);
        let target = aggregate_tier.discount_percent;
        let discounts = scanned
            .iter()
            .filter_map(|line| {
                let percent = match (self.settings.model, line.prices) {
                    (PricingModel::PercentDifferential, _) => {
                        differential_rate(target, table.rate_for(line.quantity))
                    }
                    (PricingModel::PriceAnchored, Some((current, list))) => {
                        price_anchored_rate(current, list, target)
                    }
                    // The scan keeps unpriced lines out of this model.
                    (PricingModel::PriceAnchored, None) => DiscountRate::zero(),
                };
                debug!(line_id = line.id, quantity = line.quantity, %percent, "line result");
                (!percent.is_zero()).then(|| DiscountRecord {
                    line_id: line.id.to_string(),
                    label: label.clone(),
                    percent,
                })
            })
            .collect();

        Evaluation {
            status: EvaluationStatus::Evaluated,
            discounts,
            diagnostics: diagnostics.into_vec(),
            segment: Some(segment),
            aggregate_quantity,
            aggregate_tier: Some(aggregate_tier),
        }
    }

    /// Keeps eligible lines with a positive quantity (and, for the
    /// price-anchored model, usable prices).
    fn scan<'a>(&self, lines: &'a [CartLine], diagnostics: &mut Diagnostics) -> Vec<ScannedLine<'a>> {
        let mut scanned = Vec::with_capacity(lines.len());
        for line in lines.iter().filter(|line| line.eligible) {
            if validate_quantity(line.quantity).is_err() {
                diagnostics.push(Diagnostic::InvalidQuantity {
                    line_id: line.id.clone(),
                    quantity: line.quantity,
                });
                continue;
            }
            let prices = line.prices();
            if self.settings.model == PricingModel::PriceAnchored && prices.is_none() {
                diagnostics.push(Diagnostic::MissingPrice {
                    line_id: line.id.clone(),
                });
                continue;
            }
            scanned.push(ScannedLine {
                id: &line.id,
                quantity: line.quantity,
                prices,
            });
        }
        scanned
    }
}

fn finish(status: EvaluationStatus, segment: Option<Segment>, diagnostics: Diagnostics) -> Evaluation {
    Evaluation {
        status,
        discounts: Vec::new(),
        diagnostics: diagnostics.into_vec(),
        segment,
        aggregate_quantity: 0,
        aggregate_tier: None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
