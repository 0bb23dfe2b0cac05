//! # Diagnostics
//!
//! Non-fatal findings produced while evaluating a cart.
//!
//! Every skip or fallback path records a [`Diagnostic`] instead of failing.
//! The list is returned alongside the discounts, and each entry is also
//! emitted as a `tracing` warning so hosts with a subscriber see it live.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

use crate::types::Segment;

/// A structured, non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum Diagnostic {
    /// The supplied configuration was absent or unusable.
    #[error("using built-in tier table: {reason}")]
    ConfigFallback { reason: String },

    /// A configuration key does not name a known segment.
    #[error("ignoring unknown segment key '{key}'")]
    UnknownSegmentKey { key: String },

    /// A tier failed validation and was dropped.
    #[error("dropped tier #{index} of segment {segment}: {reason}")]
    InvalidTier {
        segment: Segment,
        index: usize,
        reason: String,
    },

    /// Two tiers share a threshold; the later one wins.
    #[error("segment {segment} lists minQuantity {min_quantity} more than once, keeping the last")]
    #[serde(rename_all = "camelCase")]
    DuplicateThreshold {
        segment: Segment,
        #[ts(type = "number")]
        min_quantity: i64,
    },

    /// A segment's `basePercent` is invalid and was ignored.
    #[error("ignoring basePercent of segment {segment}: {reason}")]
    InvalidBasePercent { segment: Segment, reason: String },

    /// An eligible line has a non-positive quantity.
    #[error("skipping line {line_id}: quantity {quantity} is not positive")]
    #[serde(rename_all = "camelCase")]
    InvalidQuantity {
        line_id: String,
        #[ts(type = "number")]
        quantity: i64,
    },

    /// An eligible line lacks usable list/current prices.
    #[error("skipping line {line_id}: missing or invalid unit prices")]
    #[serde(rename_all = "camelCase")]
    MissingPrice { line_id: String },
}

/// Collects diagnostics for one evaluation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Records a diagnostic and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "evaluation diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Records each diagnostic in order, logging it like [`Diagnostics::push`].
impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}
