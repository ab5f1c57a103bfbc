pub mod storage;
pub mod types;

pub use storage::{duplicate_labels, expand_race_paths, load_race, race_label};
pub use types::{Race, RaceEntry};
