pub mod config;
pub mod output;
pub mod plot;
pub mod race;
pub mod scoring;
