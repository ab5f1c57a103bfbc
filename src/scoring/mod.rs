pub mod config;
pub mod engine;
pub mod error;
pub mod fit;
pub mod model;
pub mod sample;
pub mod skewnorm;
pub mod time;
pub mod validation;

pub use config::*;
pub use engine::{analyze_race, average_races, score, score_race, RaceAnalysis, ScoreMap};
pub use error::ScoreError;
pub use fit::fit;
pub use model::{Curve, FittedModel, DEGENERATE_SCORE};
pub use sample::fitting_sample;
pub use skewnorm::SkewNormal;
pub use time::{format_time, parse_time, RawTime, TimeParseError};
pub use validation::validate_scoring;
