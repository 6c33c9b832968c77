//! Scam detection configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::detection::{
    ScamScorer, DEFAULT_HISTORY_MARGIN, DEFAULT_HISTORY_WEIGHT, DEFAULT_THRESHOLD,
};

/// Thresholds for the lexical scam scorer
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Combined confidence at which a turn counts as a scam
    #[serde(default = "default_threshold")]
    pub scam_threshold: f64,

    /// Weight applied to the history score
    #[serde(default = "default_history_weight")]
    pub history_weight: f64,

    /// Extra confidence required when only the history carries evidence
    #[serde(default = "default_history_margin")]
    pub history_margin: f64,
}

impl DetectionConfig {
    /// Build a scorer with these settings
    pub fn scorer(&self) -> ScamScorer {
        ScamScorer::new()
            .with_threshold(self.scam_threshold)
            .with_history_weight(self.history_weight)
            .with_history_margin(self.history_margin)
    }

    /// Validate detection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.scam_threshold > 0.0 && self.scam_threshold < 1.0) {
            return Err(ValidationError::InvalidThreshold);
        }
        if !(self.history_weight >= 0.0 && self.history_margin >= 0.0) {
            return Err(ValidationError::InvalidHistoryWeighting);
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scam_threshold: default_threshold(),
            history_weight: default_history_weight(),
            history_margin: default_history_margin(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_history_weight() -> f64 {
    DEFAULT_HISTORY_WEIGHT
}

fn default_history_margin() -> f64 {
    DEFAULT_HISTORY_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.scam_threshold, 0.65);
        assert_eq!(config.history_weight, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let config = DetectionConfig {
                scam_threshold: bad,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidThreshold));
        }
    }

    #[test]
    fn test_negative_history_weight_rejected() {
        let config = DetectionConfig {
            history_weight: -0.1,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidHistoryWeighting)
        );
    }

    #[test]
    fn test_scorer_uses_threshold() {
        let config = DetectionConfig {
            scam_threshold: 0.8,
            ..Default::default()
        };
        assert_eq!(config.scorer().threshold(), 0.8);
    }
}
