use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

pub const HAPPY: &str = "happy";

/// Expression label to probability, from an external classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionVector(BTreeMap<String, f64>);

impl ExpressionVector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, label: impl Into<String>, probability: f64) -> Self {
        self.0.insert(label.into(), probability);
        self
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Probability of "happy"; an absent entry reads as 0.
    pub fn happy(&self) -> f64 {
        self.get(HAPPY).unwrap_or(0.0)
    }

    /// Every probability must be finite and within `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ScoringError> {
        match self
            .0
            .iter()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            Some((label, value)) => Err(ScoringError::InvalidExpression {
                label: label.clone(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}
