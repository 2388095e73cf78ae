//! Engine settings, loaded from a TOML document.
//!
//! ```toml
//! [recommendation]
//! default_limit = 5
//! fallback = "least_bad"
//!
//! [estimator]
//! default_resolution = "1440p"
//!
//! [estimator.tables.resolution_penalty]
//! 1080p = 1.0
//! 1440p = 0.65
//! 4K = 0.35
//! ```
//!
//! Every section is optional. A `[[category]]` array replaces the built-in
//! category table as a whole.

use serde::Deserialize;

use crate::{
    bottleneck::{BottleneckDetector, DEFAULT_BENIGN_MARGIN_PCT},
    category::{CategoryRegistry, GameCategory},
    error::{Error, Result},
    estimate::{FpsTables, HeuristicEstimator, Resolution},
    power::PowerSettings,
    recommend::FallbackPolicy,
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecommendationSettings {
    pub default_limit: usize,
    pub max_limit: usize,
    pub fallback: FallbackPolicy,
    /// Bottleneck magnitude (percent) under which a bottleneck is benign.
    pub benign_bottleneck_pct: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 10,
            fallback: FallbackPolicy::LeastBad,
            benign_bottleneck_pct: DEFAULT_BENIGN_MARGIN_PCT,
        }
    }
}

impl RecommendationSettings {
    /// The requested limit, defaulted and capped.
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&limit| limit > 0)
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }

    pub fn detector(&self) -> BottleneckDetector {
        BottleneckDetector::new(self.benign_bottleneck_pct)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EstimatorSettings {
    pub default_resolution: Resolution,
    pub tables: FpsTables,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            default_resolution: Resolution::P1440,
            tables: FpsTables::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AdvisorSettings {
    pub recommendation: RecommendationSettings,
    pub estimator: EstimatorSettings,
    pub power: PowerSettings,
    #[serde(rename = "category")]
    pub categories: Vec<GameCategory>,
}

impl AdvisorSettings {
    /// Parse and check a settings document.
    ///
    /// # Errors
    /// [`Error::Config`] when the document doesn't parse,
    /// [`Error::ConfigurationInvariantViolation`] when a value is out of range.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        let rec = &self.recommendation;
        if rec.default_limit == 0 {
            return Err(Error::invariant("recommendation.default_limit must be at least 1"));
        }
        if rec.max_limit < rec.default_limit {
            return Err(Error::invariant(format!(
                "recommendation.max_limit ({}) is below default_limit ({})",
                rec.max_limit, rec.default_limit
            )));
        }
        if !(rec.benign_bottleneck_pct.is_finite() && rec.benign_bottleneck_pct >= 0.0) {
            return Err(Error::invariant("recommendation.benign_bottleneck_pct must be non-negative"));
        }
        self.estimator.tables.check()?;
        self.power.check()
    }

    /// The configured category table, or the built-in one when none is given.
    pub fn registry(&self) -> Result<CategoryRegistry> {
        if self.categories.is_empty() {
            CategoryRegistry::builtin()
        } else {
            CategoryRegistry::from_categories(self.categories.clone())
        }
    }

    pub fn estimator(&self) -> Result<HeuristicEstimator> {
        HeuristicEstimator::new(self.estimator.tables.clone())
    }
}
