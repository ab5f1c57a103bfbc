use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use race_pct::output::{RaceColumn, TableOptions};
use race_pct::scoring::{RaceAnalysis, ScoreMap};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_SCORING: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Aligned table with raw times (default)
    Table,
    /// Tab-separated scores, no header
    Tsv,
    /// Races, fitted models and standings as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "race-pct")]
#[command(about = "Score asynchronous races by skew-normal percentile", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/race-pct/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Score for a race a player has no entry in (overrides config)
    #[arg(long)]
    default_score: Option<f64>,

    /// Decimal places for scores (overrides config)
    #[arg(long)]
    decimals: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Print the times that correspond to the reference scores for each race
    #[arg(long)]
    reference: bool,

    /// Write density plot data for each race into this directory
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Race result files (JSON objects of player -> time); globs allowed
    #[arg(required = true)]
    races: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match race_pct::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup, after command-line overrides
    let scoring = config
        .scoring
        .unwrap_or_default()
        .with_overrides(cli.default_score, cli.decimals);
    if let Err(errors) = race_pct::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let paths = match race_pct::race::expand_race_paths(&cli.races) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let mut races = Vec::with_capacity(paths.len());
    for path in &paths {
        match race_pct::race::load_race(path) {
            Ok(race) => {
                if cli.verbose {
                    eprintln!("Loaded {} ({} players) from {}", race.label, race.len(), path.display());
                }
                races.push(race);
            }
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        }
    }

    // Same-stem files in different directories share a label
    for label in race_pct::race::duplicate_labels(races.iter().map(|r| r.label.as_str())) {
        eprintln!(
            "Warning: several race files are labelled '{}'; their columns and plot files will collide",
            label
        );
    }

    // Fit and score each race
    let mut analyses: Vec<RaceAnalysis> = Vec::with_capacity(races.len());
    for race in &races {
        let analysis = match race_pct::scoring::analyze_race(race) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Scoring error in {}: {}", race.label, e);
                std::process::exit(EXIT_SCORING);
            }
        };

        match &analysis.model {
            None => {
                eprintln!(
                    "No valid finishing times in {}; skipping percentiles for this race",
                    race.label
                );
            }
            Some(model) if cli.verbose => {
                eprintln!(
                    "  {}: {} valid times, {}",
                    race.label,
                    analysis.sample.len(),
                    model
                );
            }
            Some(_) => {}
        }

        analyses.push(analysis);
    }

    let use_colors = race_pct::output::should_use_colors();

    if cli.reference {
        let reference_scores = scoring.reference_scores();
        for (race, analysis) in races.iter().zip(&analyses) {
            if let Some(model) = &analysis.model {
                println!(
                    "{}",
                    race_pct::output::format_reference_points(
                        &race.label,
                        model,
                        &reference_scores,
                        use_colors
                    )
                );
                println!();
            }
        }
    }

    if let Some(dir) = &cli.plot_dir {
        for (race, analysis) in races.iter().zip(&analyses) {
            let Some(model) = &analysis.model else {
                continue;
            };
            let data = race_pct::plot::plot_data(&race.label, &analysis.sample, model);
            match race_pct::plot::write_plot_data(dir, &data) {
                Ok(path) => {
                    if cli.verbose {
                        eprintln!("Wrote plot data to {}", path.display());
                    }
                }
                Err(e) => {
                    // Plots are a side output; keep going with the results
                    eprintln!("Plot error for {}: {:#}", race.label, e);
                }
            }
        }
    }

    // Unscorable races show their raw times but do not count toward averages
    let scorable: Vec<ScoreMap> = analyses
        .iter()
        .filter(|a| a.is_scorable())
        .map(|a| a.scores.clone())
        .collect();
    let default_score = scoring.default_score();
    let averages = race_pct::scoring::average_races(&scorable, default_score);

    let columns: Vec<RaceColumn> = races
        .iter()
        .zip(&analyses)
        .map(|(race, analysis)| RaceColumn { race, analysis })
        .collect();
    let standings = race_pct::output::rank_players(&columns, &averages, default_score);

    if cli.verbose {
        eprintln!(
            "Averaged {} of {} races over {} players",
            scorable.len(),
            races.len(),
            standings.len()
        );
    }

    let options = TableOptions {
        default_score,
        decimals: scoring.decimals(),
        use_colors,
    };

    match cli.format {
        Format::Table => {
            println!(
                "{}",
                race_pct::output::format_results_table(&columns, &standings, &options)
            );
        }
        Format::Tsv => {
            let output = race_pct::output::format_tsv(&columns, &standings, &options);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Format::Json => match race_pct::output::format_json(&columns, &standings) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Output error: {:#}", e);
                std::process::exit(EXIT_SCORING);
            }
        },
    }

    if cli.verbose {
        eprintln!();
        eprintln!("Total: {} races in {:?}", races.len(), start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}
