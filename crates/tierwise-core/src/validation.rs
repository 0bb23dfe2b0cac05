//! # Validation Module
//!
//! Invariant checks applied to configuration values and cart lines.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: serde (config.rs)                                            │
//! │  ├── JSON syntax and document shape                                    │
//! │  └── Failure → whole document rejected → built-in table                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Tier thresholds: finite, whole, > 0                               │
//! │  ├── Tier percents: finite, in [0, 100)                                │
//! │  ├── Line quantities: > 0                                              │
//! │  └── Failure → single tier / line dropped, diagnostic recorded         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{DiscountRate, Tier};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Tier Validators
// =============================================================================

/// Validates a raw tier threshold.
///
/// ## Rules
/// - Must be finite
/// - Must be a whole number
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use tierwise_core::validation::validate_min_quantity;
///
/// assert_eq!(validate_min_quantity(12.0), Ok(12));
/// assert!(validate_min_quantity(0.0).is_err());
/// assert!(validate_min_quantity(2.5).is_err());
/// ```
pub fn validate_min_quantity(raw: f64) -> ValidationResult<i64> {
    let field = "minQuantity";
    if !raw.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if raw.fract() != 0.0 {
        return Err(ValidationError::NotWholeNumber {
            field: field.to_string(),
        });
    }
    if raw <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if raw > i64::MAX as f64 / 2.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1.0,
            max: i64::MAX as f64 / 2.0,
        });
    }
    Ok(raw as i64)
}

/// Validates a raw percentage (tier discount or segment base).
///
/// ## Rules
/// - Must be finite
/// - Must be in [0, 100); values rounding up to 100 clamp to 99.99
pub fn validate_percent(field: &str, raw: f64) -> ValidationResult<DiscountRate> {
    if !raw.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    DiscountRate::from_percentage(raw).ok_or_else(|| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0.0,
        max: 100.0,
    })
}

/// Validates a raw (threshold, percent) pair into a [`Tier`].
pub fn validate_tier(min_quantity: f64, percent: f64) -> ValidationResult<Tier> {
    let min_quantity = validate_min_quantity(min_quantity)?;
    let percent = validate_percent("discountPercent", percent)?;
    Ok(Tier::new(min_quantity, percent))
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// No upper bound: aggregation saturates instead of overflowing.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
