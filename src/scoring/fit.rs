use super::error::ScoreError;
use super::model::FittedModel;
use super::skewnorm::{ln_norm_cdf, SkewNormal, LN_SQRT_2PI};
use statrs::statistics::Statistics;
use std::f64::consts::{LN_2, PI};

/// Largest |shape| the optimizer may use. Some samples keep gaining
/// likelihood as the shape grows; past this the curve is a half-normal.
pub const MAX_SHAPE: f64 = 100.0;

const MAX_ITERATIONS: usize = 10_000;
const TOLERANCE: f64 = 1e-11;
const TINY: f64 = 1e-10;

/// Parameters in optimizer space: (location, ln scale, shape) over the
/// standardized sample.
type Point = [f64; 3];

/// Fit a model to a sample of positive finishing times.
///
/// - empty sample: `Ok(None)`, the race cannot be scored
/// - one time, or several identical ones: `Degenerate`
/// - otherwise: maximum-likelihood skew-normal
///
/// The same sample always yields the same parameters.
pub fn fit(sample: &[f64]) -> Result<Option<FittedModel>, ScoreError> {
    match sample {
        [] => return Ok(None),
        [only] => return Ok(Some(FittedModel::Degenerate { value: *only })),
        _ => {}
    }
    if sample.iter().any(|x| !x.is_finite()) {
        return Err(ScoreError::NonFinite);
    }

    let mean = sample.iter().mean();
    let spread = sample.iter().population_std_dev();
    if spread <= 0.0 || !spread.is_finite() {
        return Ok(Some(FittedModel::Degenerate { value: mean }));
    }

    // Fit on z-scores so the optimizer sees the same conditioning for
    // any time unit or race length.
    let z: Vec<f64> = sample.iter().map(|x| (x - mean) / spread).collect();
    let start = moment_estimate(&z);
    let best = nelder_mead(|p| negative_log_likelihood(&z, p), start)?;

    let curve = SkewNormal::new(
        mean + spread * best[0],
        spread * best[1].exp(),
        clamp_shape(best[2]),
    )
    .ok_or(ScoreError::NonFinite)?;

    Ok(Some(FittedModel::SkewNormal(curve)))
}

fn clamp_shape(shape: f64) -> f64 {
    shape.clamp(-MAX_SHAPE, MAX_SHAPE)
}

/// Method-of-moments starting point for a standardized sample.
fn moment_estimate(z: &[f64]) -> Point {
    let n = z.len() as f64;
    // Skew-normal skewness tops out just below 1.
    let skew = (z.iter().map(|v| v.powi(3)).sum::<f64>() / n).clamp(-0.99, 0.99);

    let g = skew.abs().powf(2.0 / 3.0);
    let b = ((4.0 - PI) / 2.0).powf(2.0 / 3.0);
    let delta = (PI / 2.0 * g / (g + b)).sqrt().copysign(skew);
    let shape = delta / (1.0 - delta * delta).sqrt();
    let scale = 1.0 / (1.0 - 2.0 * delta * delta / PI).sqrt();
    let location = -scale * delta * (2.0 / PI).sqrt();

    [location, scale.ln(), shape]
}

fn negative_log_likelihood(z: &[f64], p: &Point) -> f64 {
    let [location, ln_scale, shape] = *p;
    let shape = clamp_shape(shape);
    let scale = ln_scale.exp();
    if !scale.is_finite() || scale <= 0.0 {
        return f64::INFINITY;
    }

    let total: f64 = z
        .iter()
        .map(|x| {
            let w = (x - location) / scale;
            LN_2 - ln_scale - 0.5 * w * w - LN_SQRT_2PI + ln_norm_cdf(shape * w)
        })
        .sum();

    if total.is_nan() {
        f64::INFINITY
    } else {
        -total
    }
}

/// Downhill simplex minimization from `start`.
///
/// Stops when the spread of objective values across the simplex is within
/// a relative tolerance.
fn nelder_mead<F>(objective: F, start: Point) -> Result<Point, ScoreError>
where
    F: Fn(&Point) -> f64,
{
    let mut simplex: Vec<(Point, f64)> = Vec::with_capacity(4);
    simplex.push((start, objective(&start)));
    for i in 0..3 {
        let mut vertex = start;
        vertex[i] += (0.05 * start[i].abs()).max(0.1);
        simplex.push((vertex, objective(&vertex)));
    }

    for _ in 0..MAX_ITERATIONS {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best = simplex[0].1;
        let worst = simplex[3].1;
        if !best.is_finite() {
            return Err(ScoreError::NonFinite);
        }
        if 2.0 * (worst - best).abs() <= TOLERANCE * (worst.abs() + best.abs() + TINY) {
            return Ok(simplex[0].0);
        }

        let mut centroid = [0.0; 3];
        for (vertex, _) in &simplex[..3] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / 3.0;
            }
        }
        let (worst_point, worst_value) = simplex[3];
        let toward = |t: f64| -> Point {
            let mut p = [0.0; 3];
            for i in 0..3 {
                p[i] = centroid[i] + t * (worst_point[i] - centroid[i]);
            }
            p
        };

        let reflected = toward(-1.0);
        let reflected_value = objective(&reflected);

        if reflected_value < best {
            let expanded = toward(-2.0);
            let expanded_value = objective(&expanded);
            simplex[3] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }
        if reflected_value < simplex[2].1 {
            simplex[3] = (reflected, reflected_value);
            continue;
        }

        let (contracted, accept) = if reflected_value < worst_value {
            let outside = toward(-0.5);
            let value = objective(&outside);
            ((outside, value), value <= reflected_value)
        } else {
            let inside = toward(0.5);
            let value = objective(&inside);
            ((inside, value), value < worst_value)
        };
        if accept {
            simplex[3] = contracted;
            continue;
        }

        let anchor = simplex[0].0;
        for (vertex, value) in simplex.iter_mut().skip(1) {
            for (v, a) in vertex.iter_mut().zip(&anchor) {
                *v = a + 0.5 * (*v - a);
            }
            *value = objective(vertex);
        }
    }

    Err(ScoreError::NotConverged {
        iterations: MAX_ITERATIONS,
    })
}
