use std::collections::{BTreeMap, HashSet};
use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::race::Race;
use crate::scoring::{format_time, Curve, FittedModel, RaceAnalysis, ScoreMap};

/// Narrowest the player column gets when squeezed by the terminal.
const MIN_PLAYER_WIDTH: usize = 12;

const SEPARATOR: &str = "  ";

/// A race and what was computed for it, as one results column.
pub struct RaceColumn<'a> {
    pub race: &'a Race,
    pub analysis: &'a RaceAnalysis,
}

/// One row of the standings.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub rank: usize,
    pub player: String,
    /// `None` when no race could be scored
    pub average: Option<f64>,
}

/// Formatting knobs shared by the table and TSV output.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub default_score: f64,
    pub decimals: usize,
    pub use_colors: bool,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with a fixed number of decimals.
pub fn format_score(score: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, score)
}

/// Rank every player seen in any race by average score, best first.
///
/// Players who only appear in unscorable races get `default_score` as long
/// as some race was scorable. Ties are broken by name.
pub fn rank_players(columns: &[RaceColumn], averages: &ScoreMap, default_score: f64) -> Vec<Standing> {
    let any_scorable = columns.iter().any(|c| c.analysis.is_scorable());

    let mut seen = HashSet::new();
    let mut players: Vec<&str> = Vec::new();
    let names = averages
        .keys()
        .map(String::as_str)
        .chain(columns.iter().flat_map(|c| c.race.entries.iter().map(|e| e.participant.as_str())));
    for name in names {
        if seen.insert(name) {
            players.push(name);
        }
    }

    let mut rows: Vec<(&str, Option<f64>)> = players
        .into_iter()
        .map(|name| {
            let average = match averages.get(name) {
                Some(avg) => Some(*avg),
                None if any_scorable => Some(default_score),
                None => None,
            };
            (name, average)
        })
        .collect();

    rows.sort_by(|a, b| {
        // Primary: average descending, unscored last
        let by_score = match (a.1, b.1) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        // Tie-breaker: name ascending
        by_score.then_with(|| a.0.cmp(b.0))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, (player, average))| Standing {
            rank: i + 1,
            player: player.to_string(),
            average,
        })
        .collect()
}

/// "<score> (<raw time>)" for one player in one race.
///
/// Unscorable races show "-" in place of the score; players without a raw
/// time get the bare score.
fn race_cell(column: &RaceColumn, player: &str, options: &TableOptions) -> String {
    let score = score_value(column, player, options);
    let raw = column
        .race
        .get(player)
        .map(|t| t.to_string())
        .unwrap_or_default();

    if raw.is_empty() {
        score
    } else {
        format!("{} ({})", score, raw)
    }
}

fn score_value(column: &RaceColumn, player: &str, options: &TableOptions) -> String {
    if column.analysis.is_scorable() {
        let score = column
            .analysis
            .scores
            .get(player)
            .copied()
            .unwrap_or(options.default_score);
        format_score(score, options.decimals)
    } else {
        "-".to_string()
    }
}

fn average_cell(average: Option<f64>, options: &TableOptions) -> String {
    average
        .map(|a| format_score(a, options.decimals))
        .unwrap_or_else(|| "-".to_string())
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn align_left(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

fn align_right(s: &str, width: usize) -> String {
    format!("{:>width$}", s, width = width)
}

/// Format standings as a table.
///
/// Columns: rank, player, one "score (time)" column per race, and an
/// Average column when there is more than one race.
pub fn format_results_table(
    columns: &[RaceColumn],
    standings: &[Standing],
    options: &TableOptions,
) -> String {
    format_results_table_with_width(columns, standings, options, get_terminal_width())
}

fn format_results_table_with_width(
    columns: &[RaceColumn],
    standings: &[Standing],
    options: &TableOptions,
    term_width: Option<usize>,
) -> String {
    if standings.is_empty() {
        return "No results.".to_string();
    }

    let show_average = columns.len() > 1;

    let mut headers: Vec<String> = vec!["#".to_string(), "Player".to_string()];
    headers.extend(columns.iter().map(|c| c.race.label.clone()));
    if show_average {
        headers.push("Average".to_string());
    }

    let rows: Vec<Vec<String>> = standings
        .iter()
        .map(|standing| {
            let mut row = vec![format!("{}.", standing.rank), standing.player.clone()];
            row.extend(columns.iter().map(|c| race_cell(c, &standing.player, options)));
            if show_average {
                row.push(average_cell(standing.average, options));
            }
            row
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    // Squeeze the player column first when the terminal is too narrow.
    if let Some(width) = term_width {
        let others: usize = widths
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 1)
            .map(|(_, w)| w)
            .sum::<usize>()
            + SEPARATOR.len() * (widths.len() - 1);
        let available = width.saturating_sub(others).max(MIN_PLAYER_WIDTH);
        widths[1] = widths[1].min(available);
    }

    let last = headers.len() - 1;
    let render = |cells: &[String], header: bool| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let cell = if i == 1 {
                    truncate_name(cell, widths[i])
                } else {
                    cell.clone()
                };
                // Rank and average are numeric: right-align them
                let padded = if i == 0 || (show_average && i == last) {
                    align_right(&cell, widths[i])
                } else {
                    align_left(&cell, widths[i])
                };

                if !options.use_colors {
                    padded
                } else if header {
                    padded.bold().to_string()
                } else if i == 0 {
                    padded.dimmed().to_string()
                } else if show_average && i == last {
                    padded.bold().to_string()
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR)
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(&headers, true));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(rule.join(SEPARATOR));
    lines.extend(rows.iter().map(|row| render(row, false)));
    lines.join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: rank, player, one score per race, average (only with more than
/// one race). No headers, no colors, no raw times.
pub fn format_tsv(columns: &[RaceColumn], standings: &[Standing], options: &TableOptions) -> String {
    let show_average = columns.len() > 1;

    standings
        .iter()
        .map(|standing| {
            let mut fields = vec![standing.rank.to_string(), standing.player.clone()];
            fields.extend(columns.iter().map(|c| score_value(c, &standing.player, options)));
            if show_average {
                fields.push(average_cell(standing.average, options));
            }
            fields.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct JsonRace<'a> {
    label: &'a str,
    model: Option<&'a FittedModel>,
    sample_size: usize,
    scores: BTreeMap<&'a str, f64>,
}

#[derive(Serialize)]
struct JsonStanding<'a> {
    rank: usize,
    player: &'a str,
    average: Option<f64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    races: Vec<JsonRace<'a>>,
    standings: Vec<JsonStanding<'a>>,
}

/// Format races and standings as pretty-printed JSON.
pub fn format_json(columns: &[RaceColumn], standings: &[Standing]) -> Result<String> {
    let report = JsonReport {
        races: columns
            .iter()
            .map(|c| JsonRace {
                label: &c.race.label,
                model: c.analysis.model.as_ref(),
                sample_size: c.analysis.sample.len(),
                scores: c
                    .analysis
                    .scores
                    .iter()
                    .map(|(name, score)| (name.as_str(), *score))
                    .collect(),
            })
            .collect(),
        standings: standings
            .iter()
            .map(|s| JsonStanding {
                rank: s.rank,
                player: &s.player,
                average: s.average,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize results")
}

/// Map reference scores back to elapsed times for one race.
///
/// Shows what time a player would have needed to earn each score.
pub fn format_reference_points(
    label: &str,
    model: &FittedModel,
    reference_scores: &[f64],
    use_colors: bool,
) -> String {
    let title = if use_colors {
        label.bold().to_string()
    } else {
        label.to_string()
    };

    match model {
        FittedModel::Degenerate { value } => format!(
            "{}: single finish at {}, every finisher scores {}",
            title,
            format_time(*value),
            model.percentile(*value)
        ),
        FittedModel::SkewNormal(_) => {
            let score_width = reference_scores
                .iter()
                .map(|s| s.to_string().len())
                .max()
                .unwrap_or(0);
            let mut lines = vec![format!("{} reference times:", title)];
            for score in reference_scores {
                let time = format_time(model.isf(score / 100.0));
                lines.push(format!(
                    "  {:>width$}  {}",
                    score.to_string(),
                    time,
                    width = score_width
                ));
            }
            lines.join("\n")
        }
    }
}
