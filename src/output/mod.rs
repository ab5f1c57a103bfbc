pub mod formatter;

pub use formatter::{
    format_json, format_reference_points, format_results_table, format_score, format_tsv,
    rank_players, should_use_colors, RaceColumn, Standing, TableOptions,
};
