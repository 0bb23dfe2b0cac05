//! # Tier Configuration
//!
//! Parses the shop-level tier document into strongly-typed, normalized
//! tables. Loading happens once per evaluation and never fails: an absent or
//! unusable document is replaced by the built-in table.
//!
//! ## Document Format
//! ```json
//! {
//!   "A": { "tiers": [ { "minQuantity": 12, "discountPercent": 14.07 },
//!                     { "minQuantity": 48, "discountPercent": 29.5 } ],
//!          "basePercent": 22 },
//!   "tier-b": { "tiers": [ { "minQuantity": 12, "percent": 8 } ] }
//! }
//! ```
//!
//! ## Loading Decisions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw config (Option<serde_json::Value>)                                 │
//! │     │                                                                   │
//! │     ├── None / null ────────────────────────────► built-in  + warning  │
//! │     ├── JSON string ──► parse text ──┐                                  │
//! │     └── object ──────────────────────┤                                  │
//! │                                      ▼                                  │
//! │                    shape/syntax error ──────────► built-in  + warning  │
//! │                    unknown segment key ─────────► skip key  + warning  │
//! │                    invalid tier (shape/value) ──► drop tier + warning  │
//! │                    no segment left ─────────────► built-in  + warning  │
//! │                    otherwise ───────────────────► supplied table       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Warnings about a document are only reported when that document is the one
//! in use; a fallback reports the fallback alone.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::TierTable;
use crate::types::{DiscountRate, Segment, Tier};
use crate::validation::{validate_percent, validate_tier};

// =============================================================================
// Typed Configuration
// =============================================================================

/// Pricing rules for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPricing {
    /// Volume tiers, normalized.
    pub tiers: TierTable,

    /// The segment's base wholesale discount off list, if configured.
    ///
    /// Never used as a fallback tier; the price-ratio classifier may derive
    /// its bands from it.
    pub base_percent: Option<DiscountRate>,
}

impl SegmentPricing {
    pub fn new(tiers: Vec<Tier>, base_percent: Option<DiscountRate>) -> Self {
        SegmentPricing {
            tiers: TierTable::new(tiers),
            base_percent,
        }
    }
}

/// Segment → pricing rules. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierConfig {
    segments: BTreeMap<Segment, SegmentPricing>,
}

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Supplied,
    BuiltIn,
}

/// Result of [`TierConfig::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: TierConfig,
    pub origin: ConfigOrigin,
}

// =============================================================================
// Raw Document Shape
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    /// Kept loose so one malformed tier drops alone.
    #[serde(default)]
    tiers: Vec<Value>,
    #[serde(default)]
    base_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTier {
    min_quantity: f64,
    #[serde(alias = "percent", alias = "targetPercentOffList")]
    discount_percent: f64,
}

// =============================================================================
// Loading
// =============================================================================

impl TierConfig {
    /// Builds a configuration from already-typed segments.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = (Segment, SegmentPricing)>,
    {
        TierConfig {
            segments: segments.into_iter().collect(),
        }
    }

    /// The table baked into the engine.
    ///
    /// | Segment | Tiers                     | Base |
    /// |---------|---------------------------|------|
    /// | A       | 12 → 14.07%, 48 → 29.5%   | 22%  |
    /// | B       | 12 → 8%,     48 → 16%     | 45%  |
    pub fn builtin() -> Self {
        TierConfig::from_segments([
            (
                Segment::TierA,
                SegmentPricing::new(
                    vec![
                        Tier::new(12, DiscountRate::from_bps(1407)),
                        Tier::new(48, DiscountRate::from_bps(2950)),
                    ],
                    Some(DiscountRate::from_bps(2200)),
                ),
            ),
            (
                Segment::TierB,
                SegmentPricing::new(
                    vec![
                        Tier::new(12, DiscountRate::from_bps(800)),
                        Tier::new(48, DiscountRate::from_bps(1600)),
                    ],
                    Some(DiscountRate::from_bps(4500)),
                ),
            ),
        ])
    }

    /// Loads the configuration for one evaluation.
    ///
    /// `raw` may be an already-parsed document, a JSON string holding the
    /// document (as stored in shop metadata), or absent. Never fails.
    pub fn load(raw: Option<&Value>, diagnostics: &mut Diagnostics) -> LoadedConfig {
        let parsed = match raw {
            None | Some(Value::Null) => {
                diagnostics.push(Diagnostic::ConfigFallback {
                    reason: "no configuration supplied".to_string(),
                });
                None
            }
            Some(Value::String(text)) => {
                Self::from_json_str(text, diagnostics).map_err(|err| fallback(err, diagnostics)).ok()
            }
            Some(value) => Self::from_value(value, diagnostics)
                .map_err(|err| fallback(err, diagnostics))
                .ok(),
        };

        match parsed {
            Some(config) => {
                debug!(segments = config.segments.len(), "loaded supplied tier configuration");
                LoadedConfig {
                    config,
                    origin: ConfigOrigin::Supplied,
                }
            }
            None => LoadedConfig {
                config: TierConfig::builtin(),
                origin: ConfigOrigin::BuiltIn,
            },
        }
    }

    /// Parses a configuration document from JSON text.
    pub fn from_json_str(text: &str, diagnostics: &mut Diagnostics) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value, diagnostics)
    }

    /// Parses a configuration document from a JSON value.
    ///
    /// Unknown segment keys and invalid tiers are dropped with a diagnostic.
    /// Fails only when the document is malformed or nothing usable remains;
    /// on failure `diagnostics` is left untouched.
    pub fn from_value(value: &Value, diagnostics: &mut Diagnostics) -> ConfigResult<Self> {
        let entries = value.as_object().ok_or(ConfigError::NotAnObject {
            found: json_kind(value),
        })?;

        let mut staged = Vec::new();
        let mut segments = BTreeMap::new();
        for (key, entry) in entries {
            let segment = match key.parse::<Segment>() {
                Ok(segment) => segment,
                Err(_) => {
                    staged.push(Diagnostic::UnknownSegmentKey { key: key.clone() });
                    continue;
                }
            };

            let raw = RawSegment::deserialize(entry)?;
            if let Some(pricing) = build_segment(segment, raw, &mut staged) {
                segments.insert(segment, pricing);
            }
        }

        if segments.is_empty() {
            return Err(ConfigError::NoUsableSegments);
        }
        diagnostics.extend(staged);
        Ok(TierConfig { segments })
    }

    /// Pricing rules for a segment, if configured.
    pub fn pricing(&self, segment: Segment) -> Option<&SegmentPricing> {
        self.segments.get(&segment)
    }

    /// The tier table for a segment, if configured.
    pub fn table(&self, segment: Segment) -> Option<&TierTable> {
        self.pricing(segment).map(|p| &p.tiers)
    }

    pub fn segments(&self) -> impl Iterator<Item = (Segment, &SegmentPricing)> {
        self.segments.iter().map(|(s, p)| (*s, p))
    }
}

fn fallback(err: ConfigError, diagnostics: &mut Diagnostics) {
    diagnostics.push(Diagnostic::ConfigFallback {
        reason: err.to_string(),
    });
}

fn build_segment(
    segment: Segment,
    raw: RawSegment,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<SegmentPricing> {
    let mut tiers = Vec::with_capacity(raw.tiers.len());
    for (index, entry) in raw.tiers.iter().enumerate() {
        let parsed = RawTier::deserialize(entry)
            .map_err(|err| err.to_string())
            .and_then(|raw_tier| {
                validate_tier(raw_tier.min_quantity, raw_tier.discount_percent)
                    .map_err(|err| err.to_string())
            });
        match parsed {
            Ok(tier) => tiers.push(tier),
            Err(reason) => diagnostics.push(Diagnostic::InvalidTier {
                segment,
                index,
                reason,
            }),
        }
    }

    let (table, duplicates) = TierTable::normalize(tiers);
    for min_quantity in duplicates {
        diagnostics.push(Diagnostic::DuplicateThreshold {
            segment,
            min_quantity,
        });
    }
    if table.is_empty() {
        return None;
    }

    let base_percent = raw
        .base_percent
        .and_then(|pct| match validate_percent("basePercent", pct) {
            Ok(rate) => Some(rate),
            Err(err) => {
                diagnostics.push(Diagnostic::InvalidBasePercent {
                    segment,
                    reason: err.to_string(),
                });
                None
            }
        });

    Some(SegmentPricing {
        tiers: table,
        base_percent,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(raw: Option<Value>) -> (LoadedConfig, Vec<Diagnostic>) {
        let mut diagnostics = Diagnostics::new();
        let loaded = TierConfig::load(raw.as_ref(), &mut diagnostics);
        (loaded, diagnostics.into_vec())
    }

    #[test]
    fn test_absent_config_falls_back_with_warning() {
        let (loaded, diags) = load(None);
        assert_eq!(loaded.origin, ConfigOrigin::BuiltIn);
        assert_eq!(loaded.config, TierConfig::builtin());
        assert!(matches!(diags.as_slice(), [Diagnostic::ConfigFallback { .. }]));

        let (loaded, _) = load(Some(Value::Null));
        assert_eq!(loaded.origin, ConfigOrigin::BuiltIn);
    }

    #[test]
    fn test_parses_object_document() {
        let (loaded, diags) = load(Some(json!({
            "A": {
                "tiers": [
                    { "minQuantity": 48, "discountPercent": 29.5 },
                    { "minQuantity": 12, "discountPercent": 14.07 }
                ],
                "basePercent": 22
            },
            "tier-b": { "tiers": [ { "minQuantity": 10, "percent": 5 } ] }
        })));

        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(loaded.origin, ConfigOrigin::Supplied);

        let a = loaded.config.pricing(Segment::TierA).unwrap();
        assert_eq!(a.base_percent, Some(DiscountRate::from_bps(2200)));
        let thresholds: Vec<_> = a.tiers.tiers().iter().map(|t| t.min_quantity).collect();
        assert_eq!(thresholds, vec![12, 48]);

        let b = loaded.config.table(Segment::TierB).unwrap();
        assert_eq!(b.resolve(10).unwrap().discount_percent.bps(), 500);
    }

    #[test]
    fn test_parses_serialized_json_string() {
        let text = r#"{"B":{"tiers":[{"minQuantity":6,"targetPercentOffList":50}]}}"#;
        let (loaded, diags) = load(Some(Value::String(text.to_string())));
        assert!(diags.is_empty());
        assert_eq!(loaded.origin, ConfigOrigin::Supplied);
        assert!(loaded.config.table(Segment::TierA).is_none());
        assert_eq!(
            loaded.config.table(Segment::TierB).unwrap().rate_for(6).bps(),
            5000
        );
    }

    #[test]
    fn test_malformed_documents_fall_back() {
        for raw in [
            Value::String("{not json".to_string()),
            json!([1, 2, 3]),
            json!(42),
            json!({ "A": { "tiers": "lots" } }),
            json!({ "A": { "tiers": [ { "minQuantity": 12 } ] } }),
            json!({ "A": { "tiers": [ "twelve" ] } }),
            json!({}),
        ] {
            let (loaded, diags) = load(Some(raw.clone()));
            assert_eq!(loaded.origin, ConfigOrigin::BuiltIn, "raw: {raw}");
            assert!(
                diags
                    .iter()
                    .any(|d| matches!(d, Diagnostic::ConfigFallback { .. })),
                "raw: {raw}"
            );
        }
    }

    #[test]
    fn test_invalid_tiers_are_dropped_individually() {
        let (loaded, diags) = load(Some(json!({
            "A": { "tiers": [
                { "minQuantity": -4, "discountPercent": 10 },
                { "minQuantity": 12, "discountPercent": 14.07 },
                { "minQuantity": 24, "discountPercent": 140 }
            ] }
        })));

        assert_eq!(loaded.origin, ConfigOrigin::Supplied);
        assert_eq!(loaded.config.table(Segment::TierA).unwrap().len(), 1);
        let dropped: Vec<_> = diags
            .iter()
            .filter_map(|d| match d {
                Diagnostic::InvalidTier { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(dropped, vec![0, 2]);
    }

    #[test]
    fn test_malformed_tier_shape_is_dropped_like_bad_values() {
        let (loaded, diags) = load(Some(json!({
            "A": { "tiers": [ { "minQuantity": 12, "discountPercent": 14.07 } ] },
            "B": { "tiers": [
                { "minQuantity": 12 },
                { "minQuantity": 24, "percent": 10 }
            ] }
        })));

        assert_eq!(loaded.origin, ConfigOrigin::Supplied);
        assert_eq!(loaded.config.table(Segment::TierB).unwrap().rate_for(30).bps(), 1000);
        assert!(matches!(
            diags.as_slice(),
            [Diagnostic::InvalidTier {
                segment: Segment::TierB,
                index: 0,
                ..
            }]
        ));
    }

    #[test]
    fn test_rejected_document_reports_only_the_fallback() {
        let (loaded, diags) = load(Some(json!({
            "A": { "tiers": [
                { "minQuantity": -1, "discountPercent": 10 },
                { "minQuantity": 12, "discountPercent": 14.07 }
            ] },
            "retail": {},
            "B": { "tiers": "lots" }
        })));

        assert_eq!(loaded.origin, ConfigOrigin::BuiltIn);
        assert!(
            matches!(diags.as_slice(), [Diagnostic::ConfigFallback { .. }]),
            "unexpected diagnostics: {diags:?}"
        );
    }

    #[test]
    fn test_segment_with_no_valid_tier_is_unusable() {
        let (loaded, _) = load(Some(json!({
            "A": { "tiers": [ { "minQuantity": 12, "discountPercent": 14.07 } ] },
            "B": { "tiers": [ { "minQuantity": 0, "discountPercent": 10 } ] }
        })));
        assert_eq!(loaded.origin, ConfigOrigin::Supplied);
        assert!(loaded.config.pricing(Segment::TierB).is_none());
    }

    #[test]
    fn test_unknown_keys_and_bad_base_are_reported() {
        let (loaded, diags) = load(Some(json!({
            "retail": { "tiers": [] },
            "A": {
                "tiers": [ { "minQuantity": 12, "discountPercent": 14.07 } ],
                "basePercent": 180
            }
        })));
        assert_eq!(loaded.origin, ConfigOrigin::Supplied);
        assert_eq!(loaded.config.pricing(Segment::TierA).unwrap().base_percent, None);
        assert!(diags.contains(&Diagnostic::UnknownSegmentKey {
            key: "retail".to_string()
        }));
        assert!(diags
            .iter()
            .any(|d| matches!(d, Diagnostic::InvalidBasePercent { .. })));
    }

    #[test]
    fn test_duplicate_thresholds_reported() {
        let (loaded, diags) = load(Some(json!({
            "A": { "tiers": [
                { "minQuantity": 12, "discountPercent": 10 },
                { "minQuantity": 12, "discountPercent": 12 }
            ] }
        })));
        assert_eq!(
            loaded.config.table(Segment::TierA).unwrap().rate_for(12).bps(),
            1200
        );
        assert_eq!(
            diags,
            vec![Diagnostic::DuplicateThreshold {
                segment: Segment::TierA,
                min_quantity: 12
            }]
        );
    }

    #[test]
    fn test_builtin_table() {
        let config = TierConfig::builtin();
        let a = config.table(Segment::TierA).unwrap();
        assert_eq!(a.rate_for(12).bps(), 1407);
        assert_eq!(a.rate_for(48).bps(), 2950);
        assert_eq!(config.segments().count(), 2);
    }
}
