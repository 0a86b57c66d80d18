use thiserror::Error;

/// Problems with a ranking configuration. Scoring itself cannot fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("weight '{dimension}' must not be negative, got {value}")]
    NegativeWeight { dimension: &'static str, value: f64 },

    #[error("weight '{dimension}' must be finite, got {value}")]
    NonFiniteWeight { dimension: &'static str, value: f64 },

    #[error("limit must be greater than zero")]
    ZeroLimit,

    #[error("cannot normalize weights that sum to {0}")]
    ZeroWeightSum(f64),
}
