//! Decision Thresholds
//!
//! Can be loaded from config file or set at runtime.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Warn/block thresholds per algorithm (exact is always 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub fuzzy_warn: f64,
    pub fuzzy_block: f64,
    pub semantic_warn: f64,
    pub semantic_block: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            fuzzy_warn: constants::FUZZY_WARN_THRESHOLD,
            fuzzy_block: constants::FUZZY_BLOCK_THRESHOLD,
            semantic_warn: constants::SEMANTIC_WARN_THRESHOLD,
            semantic_block: constants::SEMANTIC_BLOCK_THRESHOLD,
        }
    }
}

impl DecisionThresholds {
    /// Every value in [0, 1] and warn <= block
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("fuzzy_warn", self.fuzzy_warn),
            ("fuzzy_block", self.fuzzy_block),
            ("semantic_warn", self.semantic_warn),
            ("semantic_block", self.semantic_block),
        ];
        for (name, value) in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if self.fuzzy_warn > self.fuzzy_block {
            return Err(format!(
                "fuzzy_warn ({}) must not exceed fuzzy_block ({})",
                self.fuzzy_warn, self.fuzzy_block
            ));
        }
        if self.semantic_warn > self.semantic_block {
            return Err(format!(
                "semantic_warn ({}) must not exceed semantic_block ({})",
                self.semantic_warn, self.semantic_block
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let t = DecisionThresholds::default();
        assert_eq!(t.fuzzy_warn, 0.75);
        assert_eq!(t.fuzzy_block, 0.90);
        assert_eq!(t.semantic_warn, 0.80);
        assert_eq!(t.semantic_block, 0.92);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_or_out_of_range() {
        let inverted = DecisionThresholds {
            fuzzy_warn: 0.95,
            fuzzy_block: 0.90,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let out_of_range = DecisionThresholds {
            semantic_block: 1.2,
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: DecisionThresholds = serde_json::from_str(r#"{"fuzzy_block": 0.95}"#).unwrap();
        assert_eq!(t.fuzzy_block, 0.95);
        assert_eq!(t.fuzzy_warn, 0.75);
    }
}
