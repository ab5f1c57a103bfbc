use super::time::TimeParseError;
use thiserror::Error;

/// Errors raised while fitting or scoring a race.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A time string in the race did not parse.
    #[error(transparent)]
    Parse(#[from] TimeParseError),

    /// Scoring was requested without a fitted model.
    #[error("no fitted model: the race has no valid finishing times")]
    NoModel,

    /// The likelihood optimizer ran out of iterations.
    #[error("distribution fit did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// The sample or the likelihood produced a non-finite value.
    #[error("distribution fit hit a non-finite value")]
    NonFinite,
}
