//! Data for drawing a race's density curve over its histogram.
//!
//! Rendering is left to an external plotter; this module only produces
//! the points and writes them out as JSON.

use crate::scoring::{Curve, FittedModel};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Fewest evenly spaced points in a grid, however small the sample.
const MIN_GRID_POINTS: usize = 10;

/// Survival probabilities whose times extend the grid into the tails.
const TAIL_QUANTILES: [f64; 2] = [0.999, 0.001];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub label: String,
    pub model: FittedModel,
    pub sample: Vec<f64>,
    pub curve: Vec<PlotPoint>,
}

/// Points at which to evaluate a race's density.
///
/// The sample itself, an even spread from its min to max, and for a
/// skew-normal model the times at the 0.1% and 99.9% survival levels.
/// Sorted and without duplicates.
pub fn evaluation_grid(sample: &[f64], model: &FittedModel) -> Vec<f64> {
    let mut grid: Vec<f64> = sample.iter().copied().filter(|x| x.is_finite()).collect();

    let min = grid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = grid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        let n = grid.len().max(MIN_GRID_POINTS);
        let step = (max - min) / (n - 1) as f64;
        grid.extend((0..n).map(|i| min + step * i as f64));
    }

    if let FittedModel::SkewNormal(curve) = model {
        grid.extend(
            TAIL_QUANTILES
                .iter()
                .map(|q| curve.isf(*q))
                .filter(|x| x.is_finite()),
        );
    }

    grid.sort_by(|a, b| a.total_cmp(b));
    grid.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.abs().max(1.0));
    grid
}

/// Sample, grid and density values for one race.
pub fn plot_data(label: &str, sample: &[f64], model: &FittedModel) -> PlotData {
    let curve = evaluation_grid(sample, model)
        .into_iter()
        .map(|x| PlotPoint {
            x,
            density: model.pdf(x),
        })
        .collect();

    PlotData {
        label: label.to_string(),
        model: *model,
        sample: sample.to_vec(),
        curve,
    }
}

/// Write plot data to `<dir>/<label>.pdf.json` atomically, returning the path.
pub fn write_plot_data(dir: &Path, data: &PlotData) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create plot directory at {}", dir.display()))?;

    let path = dir.join(format!("{}.pdf.json", data.label));
    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, data).context("Failed to serialize plot data")?;

    file.commit()
        .with_context(|| format!("Failed to save plot data to {}", path.display()))?;

    Ok(path)
}
