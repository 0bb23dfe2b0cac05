//! # Error Types
//!
//! Domain-specific error types for tierwise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tierwise-core errors (this file)                                      │
//! │  ├── ConfigError      - Tier configuration document unusable           │
//! │  └── ValidationError  - A single tier / line breaks an invariant       │
//! │                                                                         │
//! │  Neither ever escapes Engine::evaluate. Both are downgraded to a       │
//! │  Diagnostic and processing continues:                                  │
//! │                                                                         │
//! │  ConfigError ──────► Diagnostic::ConfigFallback   (use default table)  │
//! │  ValidationError ──► Diagnostic::InvalidTier      (drop the tier)      │
//! │                  └─► Diagnostic::InvalidQuantity  (skip the line)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Config Error
// =============================================================================

/// The tier configuration document cannot be used at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the expected shape.
    #[error("malformed tier configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is not a JSON object keyed by segment.
    #[error("tier configuration must be a JSON object keyed by segment, got {found}")]
    NotAnObject { found: &'static str },

    /// Parsing succeeded but no segment kept a single valid tier.
    #[error("tier configuration defines no usable segment")]
    NoUsableSegments,
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single value violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// NaN or infinite number.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Fractional value where a count is expected.
    #[error("{field} must be a whole number")]
    NotWholeNumber { field: String },
}

/// Convenience type alias for config loading results.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
