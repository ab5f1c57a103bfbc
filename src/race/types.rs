use crate::scoring::RawTime;
use anyhow::{bail, Result};
use serde_json::Value;

/// One participant's line in a race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEntry {
    pub participant: String,
    pub time: RawTime,
}

/// A single race: participants in record order plus a display label.
///
/// The label is opaque to scoring; it only ends up in table headers and
/// file names.
#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    pub label: String,
    pub entries: Vec<RaceEntry>,
}

impl Race {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    /// Add or replace a participant's time, keeping first-seen order.
    pub fn with_entry(mut self, participant: impl Into<String>, time: RawTime) -> Self {
        let participant = participant.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.participant == participant) {
            entry.time = time;
        } else {
            self.entries.push(RaceEntry { participant, time });
        }
        self
    }

    /// Build a race from a JSON object of participant -> time.
    ///
    /// Accepted values: "HH:MM:SS" strings, numbers of seconds, "" and null.
    /// Strings are not parsed here, so a malformed time only fails once the
    /// race is scored.
    pub fn from_json(label: impl Into<String>, value: &Value) -> Result<Self> {
        let label = label.into();
        let Value::Object(map) = value else {
            bail!("Race '{}' must be a JSON object of participant -> time", label);
        };

        let mut race = Race::new(label);
        for (participant, raw) in map {
            let time = match raw {
                Value::String(s) => RawTime::from_text(s.as_str()),
                Value::Number(n) => match n.as_f64() {
                    Some(seconds) => RawTime::Numeric(seconds),
                    None => bail!("Race '{}': time for '{}' is out of range", race.label, participant),
                },
                Value::Null => RawTime::Absent,
                other => bail!(
                    "Race '{}': time for '{}' must be a string, number or null, got {}",
                    race.label,
                    participant,
                    other
                ),
            };
            race = race.with_entry(participant.as_str(), time);
        }
        Ok(race)
    }

    pub fn times(&self) -> impl Iterator<Item = &RawTime> {
        self.entries.iter().map(|e| &e.time)
    }

    pub fn get(&self, participant: &str) -> Option<&RawTime> {
        self.entries
            .iter()
            .find(|e| e.participant == participant)
            .map(|e| &e.time)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
