use super::types::Race;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Display label for a race file: its file name without extension.
pub fn race_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load one race from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not valid JSON, or is
/// not an object of participant -> time.
pub fn load_race(path: &Path) -> Result<Race> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open race file at {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse race file: invalid JSON in {}", path.display()))?;

    Race::from_json(race_label(path), &value)
        .with_context(|| format!("Invalid race file {}", path.display()))
}

/// Expand command-line race arguments into file paths.
///
/// Arguments containing glob characters are expanded (sorted, as `glob`
/// returns them) and must match at least one file; anything else is taken
/// literally.
pub fn expand_race_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let before = paths.len();
        for entry in glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?
        {
            paths.push(entry.with_context(|| format!("Failed to read match for '{}'", pattern))?);
        }
        if paths.len() == before {
            anyhow::bail!("No race files match '{}'", pattern);
        }
    }
    Ok(paths)
}

/// Labels shared by more than one race, in first-seen order.
///
/// Races from files with the same stem in different directories end up
/// with the same label, so their columns and plot files collide.
pub fn duplicate_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for label in labels {
        if !seen.insert(label) && !duplicates.iter().any(|d| d == label) {
            duplicates.push(label.to_string());
        }
    }
    duplicates
}
