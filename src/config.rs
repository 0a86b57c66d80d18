use serde::Deserialize;

use crate::error::ConfigError;
use crate::ranker::{Ranker, DEFAULT_SUGGESTION_LIMIT};
use crate::weights::WeightVector;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Caller-side ranking settings, usually loaded from TOML.
///
/// ```toml
/// limit = 5
/// normalize_weights = false
///
/// [weights]
/// name = 0.40
/// account = 0.25
/// ```
///
/// Missing weight keys fall back to the default vector.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    #[serde(default)]
    pub weights: WeightVector,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Rescale `weights` to sum to 1.0 after loading.
    #[serde(default)]
    pub normalize_weights: bool,
}

fn default_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: WeightVector::DEFAULT,
            limit: DEFAULT_SUGGESTION_LIMIT,
            normalize_weights: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RankingConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let mut config: RankingConfig = toml::from_str(input)?;
        config.validate()?;
        if config.normalize_weights {
            config.weights = config
                .weights
                .normalized()
                .ok_or_else(|| ConfigError::ZeroWeightSum(config.weights.sum()))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (dimension, value) in WeightVector::DIMENSIONS
            .into_iter()
            .zip(self.weights.as_array())
        {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { dimension, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { dimension, value });
            }
        }

        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }

        Ok(())
    }

    /// A ranker using these weights and the neutral group strategy.
    pub fn ranker(&self) -> Ranker {
        Ranker::new().with_weights(self.weights)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
