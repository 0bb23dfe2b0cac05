//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Invalid values are logged and ignored; the shell never refuses
//! to evaluate because of a bad override.

use std::env;
use std::str::FromStr;

use tierwise_core::types::DiscountRate;
use tierwise_core::{
    EngineSettings, IdentityClassifier, PriceRatioClassifier, PricingModel, SegmentClassifier,
};
use tracing::warn;

/// Which classifier strategy the engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    #[default]
    Identity,
    PriceRatio,
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(ClassifierKind::Identity),
            "price-ratio" | "price_ratio" | "ratio" => Ok(ClassifierKind::PriceRatio),
            other => Err(format!("unknown classifier '{}'", other)),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Engine settings (`TIERWISE_MODEL`, `TIERWISE_LABEL`)
    pub settings: EngineSettings,

    /// Segment classifier (`TIERWISE_CLASSIFIER`)
    pub classifier: ClassifierKind,

    /// Half-width of price-ratio bands derived from `basePercent`
    /// (`TIERWISE_BASE_TOLERANCE`, in percent). Unset keeps the fixed bands.
    pub base_tolerance: Option<DiscountRate>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            settings: EngineSettings::default(),
            classifier: ClassifierKind::Identity,
            base_tolerance: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CliConfig::default();

        if let Some(raw) = lookup("TIERWISE_MODEL") {
            match raw.parse::<PricingModel>() {
                Ok(model) => config.settings.model = model,
                Err(err) => warn!(%err, "ignoring TIERWISE_MODEL"),
            }
        }

        if let Some(raw) = lookup("TIERWISE_CLASSIFIER") {
            match raw.parse::<ClassifierKind>() {
                Ok(kind) => config.classifier = kind,
                Err(err) => warn!(%err, "ignoring TIERWISE_CLASSIFIER"),
            }
        }

        if let Some(label) = lookup("TIERWISE_LABEL") {
            let label = label.trim();
            if label.is_empty() {
                warn!("ignoring empty TIERWISE_LABEL");
            } else {
                config.settings.label_title = label.to_string();
            }
        }

        if let Some(raw) = lookup("TIERWISE_BASE_TOLERANCE") {
            match raw.trim().parse::<f64>().ok().and_then(DiscountRate::from_percentage) {
                Some(tolerance) => config.base_tolerance = Some(tolerance),
                None => warn!(value = %raw, "ignoring TIERWISE_BASE_TOLERANCE"),
            }
        }

        config
    }

    /// Builds the configured classifier strategy.
    pub fn build_classifier(&self) -> Box<dyn SegmentClassifier> {
        match self.classifier {
            ClassifierKind::Identity => Box::new(IdentityClassifier::default()),
            ClassifierKind::PriceRatio => {
                let classifier = PriceRatioClassifier::default();
                match self.base_tolerance {
                    Some(tolerance) => Box::new(classifier.derive_from_base(tolerance)),
                    None => Box::new(classifier),
                }
            }
        }
    }
}
