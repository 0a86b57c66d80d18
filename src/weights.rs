use serde::{Deserialize, Serialize};

/// Weights for the five scoring signals.
///
/// Passed by value into every ranking call; there is no process-wide default
/// that callers can mutate. The engine does not check that the components sum
/// to 1.0. A vector that does not may push confidence outside [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightVector {
    pub name: f64,
    pub account: f64,
    pub keyword: f64,
    pub group: f64,
    pub completeness: f64,
}

impl WeightVector {
    pub const DEFAULT: Self = Self {
        name: 0.40,
        account: 0.25,
        keyword: 0.15,
        group: 0.10,
        completeness: 0.10,
    };

    /// Field names in `as_array` order, for diagnostics.
    pub const DIMENSIONS: [&'static str; 5] =
        ["name", "account", "keyword", "group", "completeness"];

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.name,
            self.account,
            self.keyword,
            self.group,
            self.completeness,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// True when the components sum to 1.0 within floating-point noise.
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }

    /// A copy rescaled to sum to 1.0, or `None` when the sum is not positive.
    pub fn normalized(&self) -> Option<Self> {
        let sum = self.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return None;
        }
        Some(Self {
            name: self.name / sum,
            account: self.account / sum,
            keyword: self.keyword / sum,
            group: self.group / sum,
            completeness: self.completeness / sum,
        })
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::DEFAULT
    }
}
