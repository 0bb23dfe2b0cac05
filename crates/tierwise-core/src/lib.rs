//! # tierwise-core: Aggregate-Quantity Volume Discounts
//!
//! This crate decides, for one cart snapshot, how much ADDITIONAL discount
//! each eligible line needs so that a wholesale buyer pays the tier price
//! earned by the cart's TOTAL quantity, not each line's own quantity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tierwise Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Host (checkout function / tierwise-cli)          │   │
//! │  │       cart snapshot + buyer + tier document  ──►  JSON          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ EvaluationInput                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tierwise-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  config   │  │classifier │  │ resolver  │  │calculator │  │   │
//! │  │   │TierConfig │  │ Identity  │  │ TierTable │  │differential│ │   │
//! │  │   │ fallback  │  │PriceRatio │  │  resolve  │  │ anchored  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                          ▲                                      │   │
//! │  │                   engine (orchestration)                        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • SAME INPUT = SAME OUTPUT           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Evaluation { discounts, diagnostics }  │
//! │                                ▼                                        │
//! │                    Host applies per-line percentages                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Segment, Tier, CartLine, DiscountRecord)
//! - [`money`] - Fixed-point unit prices (micro-units) for price-based math
//! - [`config`] - Tier configuration loading with built-in fallback
//! - [`resolver`] - Highest-tier-met lookup
//! - [`calculator`] - Per-line discount deltas
//! - [`classifier`] - Segment classification strategies
//! - [`engine`] - One evaluation, end to end
//! - [`diagnostic`] - Non-fatal problems reported alongside results
//! - [`error`] / [`validation`] - Typed errors and input rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: one evaluation reads one snapshot, writes nothing
//! 2. **Integer Percentages**: basis points (0.01%) with half-up rounding
//! 3. **Never Fail the Checkout**: bad input degrades to "no discount" plus
//!    a diagnostic, never a panic
//!
//! ## Example Usage
//!
//! ```rust
//! use tierwise_core::{BuyerInfo, CartLine, Engine, EngineSettings, EvaluationInput};
//! use tierwise_core::classifier::IdentityClassifier;
//!
//! let engine = Engine::new(IdentityClassifier::default(), EngineSettings::default());
//!
//! // No config supplied: the built-in table applies (A: 12 → 14.07%, 48 → 29.5%).
//! let result = engine.evaluate(&EvaluationInput {
//!     buyer: BuyerInfo::with_labels(["Wholesale Tier A"]),
//!     lines: vec![CartLine::eligible("l1", 30), CartLine::eligible("l2", 20)],
//!     config: None,
//! });
//!
//! // Each line already earns 14.07% alone; 50 units earn 29.5%.
//! assert_eq!(result.aggregate_quantity, 50);
//! assert_eq!(result.discounts[0].percent.to_string(), "17.96");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod classifier;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod money;
pub mod resolver;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tierwise_core::Engine` instead of
// `use tierwise_core::engine::Engine`

pub use classifier::{IdentityClassifier, PriceRatioClassifier, SegmentClassifier};
pub use config::{ConfigOrigin, LoadedConfig, SegmentPricing, TierConfig};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use engine::{
    DiscountOutput, Engine, EngineSettings, Evaluation, EvaluationInput, EvaluationStatus,
    PricingModel,
};
pub use error::{ConfigError, ValidationError};
pub use money::Money;
pub use resolver::TierTable;
pub use types::*;
