use serde::{Deserialize, Serialize};

/// Default score for a player with no entry in a race.
pub const DEFAULT_MISSING_SCORE: f64 = 0.0;

/// Decimal places shown for scores.
pub const DEFAULT_DECIMALS: usize = 3;

/// Scores mapped back to times in the reference report.
pub const DEFAULT_REFERENCE_SCORES: [f64; 5] = [99.9999, 75.0, 50.0, 25.0, 0.0001];

/// Scoring configuration.
///
/// Every field is optional; unset fields fall back to the defaults above.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   default_score: 0
///   decimals: 3
///   reference_scores: [99.9999, 75, 50, 25, 0.0001]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score used for a race the player has no entry in when averaging
    #[serde(default)]
    pub default_score: Option<f64>,

    /// Decimal places for scores in table and TSV output
    #[serde(default)]
    pub decimals: Option<usize>,

    /// Percentile scores to convert back into elapsed times for the
    /// reference report, each strictly between 0 and 100
    #[serde(default)]
    pub reference_scores: Option<Vec<f64>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_score: Some(DEFAULT_MISSING_SCORE),
            decimals: Some(DEFAULT_DECIMALS),
            reference_scores: Some(DEFAULT_REFERENCE_SCORES.to_vec()),
        }
    }
}

impl ScoringConfig {
    pub fn default_score(&self) -> f64 {
        self.default_score.unwrap_or(DEFAULT_MISSING_SCORE)
    }

    pub fn decimals(&self) -> usize {
        self.decimals.unwrap_or(DEFAULT_DECIMALS)
    }

    pub fn reference_scores(&self) -> Vec<f64> {
        self.reference_scores
            .clone()
            .unwrap_or_else(|| DEFAULT_REFERENCE_SCORES.to_vec())
    }

    /// Overlay values given on the command line.
    pub fn with_overrides(mut self, default_score: Option<f64>, decimals: Option<usize>) -> Self {
        if default_score.is_some() {
            self.default_score = default_score;
        }
        if decimals.is_some() {
            self.decimals = decimals;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.default_score, Some(0.0));
        assert_eq!(config.decimals, Some(3));
        assert_eq!(config.reference_scores().len(), 5);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
default_score: 10
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.default_score, Some(10.0));
        assert!(config.decimals.is_none());
        assert_eq!(config.decimals(), DEFAULT_DECIMALS);
        assert_eq!(config.reference_scores(), DEFAULT_REFERENCE_SCORES.to_vec());
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.default_score.is_none());
        assert_eq!(config.default_score(), 0.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ScoringConfig, _> = serde_saphyr::from_str("base_score: 100\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = ScoringConfig::default().with_overrides(Some(25.0), None);
        assert_eq!(config.default_score(), 25.0);
        assert_eq!(config.decimals(), DEFAULT_DECIMALS);

        let config = config.with_overrides(None, Some(1));
        assert_eq!(config.default_score(), 25.0);
        assert_eq!(config.decimals(), 1);
    }
}
