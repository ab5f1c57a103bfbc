use super::config::ScoringConfig;

/// Largest number of decimal places accepted for score output.
const MAX_DECIMALS: usize = 10;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(default) = config.default_score {
        if !(0.0..=100.0).contains(&default) {
            errors.push(format!(
                "scoring.default_score: must be between 0 and 100, got {}",
                default
            ));
        }
    }

    if let Some(decimals) = config.decimals {
        if decimals > MAX_DECIMALS {
            errors.push(format!(
                "scoring.decimals: must be at most {}, got {}",
                MAX_DECIMALS, decimals
            ));
        }
    }

    if let Some(ref scores) = config.reference_scores {
        for (i, score) in scores.iter().enumerate() {
            if !(*score > 0.0 && *score < 100.0) {
                errors.push(format!(
                    "scoring.reference_scores[{}]: must be strictly between 0 and 100, got {}",
                    i, score
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
