use super::error::ScoreError;
use super::fit::fit;
use super::model::FittedModel;
use super::sample::fitting_sample;
use crate::race::Race;
use std::collections::{HashMap, HashSet};

/// Participant -> score for one race, or averaged over several.
pub type ScoreMap = HashMap<String, f64>;

/// Everything computed for one race: the fitting sample, the model (if the
/// race is scorable) and every participant's score.
#[derive(Debug, Clone)]
pub struct RaceAnalysis {
    pub sample: Vec<f64>,
    pub model: Option<FittedModel>,
    pub scores: ScoreMap,
}

impl RaceAnalysis {
    pub fn is_scorable(&self) -> bool {
        self.model.is_some()
    }
}

/// Percentile score for one finishing time against a race's model.
///
/// Errors with `NoModel` when the race had nothing to fit; callers are
/// expected to check for an unscorable race first.
pub fn score(seconds: f64, model: Option<&FittedModel>) -> Result<f64, ScoreError> {
    let model = model.ok_or(ScoreError::NoModel)?;
    Ok(model.percentile(seconds))
}

/// Score every participant of a race.
///
/// An empty sample gives an empty map. Participants without a valid finish
/// (missing, empty or non-positive time) score 0. A supplied `model` is used
/// as-is; otherwise one is fitted from the race's own sample.
pub fn score_race(race: &Race, model: Option<&FittedModel>) -> Result<ScoreMap, ScoreError> {
    let sample = fitting_sample(race.times())?;
    if sample.is_empty() {
        return Ok(ScoreMap::new());
    }

    let fitted;
    let model = match model {
        Some(m) => m,
        None => {
            fitted = fit(&sample)?.ok_or(ScoreError::NoModel)?;
            &fitted
        }
    };

    let mut scores = ScoreMap::with_capacity(race.len());
    for entry in &race.entries {
        let value = match entry.time.seconds()? {
            Some(seconds) if seconds > 0.0 => score(seconds, Some(model))?,
            _ => 0.0,
        };
        scores.insert(entry.participant.clone(), value);
    }
    Ok(scores)
}

/// Sample, fit and score a race in one pass, keeping the intermediate
/// pieces for reports and plots.
pub fn analyze_race(race: &Race) -> Result<RaceAnalysis, ScoreError> {
    let sample = fitting_sample(race.times())?;
    let model = fit(&sample)?;
    let scores = match &model {
        Some(m) => score_race(race, Some(m))?,
        None => ScoreMap::new(),
    };

    Ok(RaceAnalysis {
        sample,
        model,
        scores,
    })
}

/// Average each participant's score across races.
///
/// Every participant seen in any map is included; a race without an entry
/// for them contributes `default`. No races gives an empty map.
pub fn average_races(races: &[ScoreMap], default: f64) -> ScoreMap {
    if races.is_empty() {
        return ScoreMap::new();
    }

    let names: HashSet<&String> = races.iter().flat_map(|r| r.keys()).collect();
    let count = races.len() as f64;

    names
        .into_iter()
        .map(|name| {
            let total: f64 = races
                .iter()
                .map(|r| r.get(name).copied().unwrap_or(default))
                .sum();
            (name.clone(), total / count)
        })
        .collect()
}
