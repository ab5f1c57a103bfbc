use super::skewnorm::SkewNormal;
use serde::Serialize;
use std::fmt;

/// Score given to every finisher when a race has a single valid time.
pub const DEGENERATE_SCORE: f64 = 50.0;

/// What a fitted curve can answer: density, survival and its inverse.
pub trait Curve {
    fn pdf(&self, x: f64) -> f64;
    fn sf(&self, x: f64) -> f64;
    fn isf(&self, q: f64) -> f64;
}

impl Curve for SkewNormal {
    fn pdf(&self, x: f64) -> f64 {
        SkewNormal::pdf(self, x)
    }

    fn sf(&self, x: f64) -> f64 {
        SkewNormal::sf(self, x)
    }

    fn isf(&self, q: f64) -> f64 {
        SkewNormal::isf(self, q)
    }
}

/// The model fitted to one race's sample.
///
/// Chosen once at fit time so callers never branch on sample size again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedModel {
    /// Maximum-likelihood skew-normal over two or more distinct times.
    SkewNormal(SkewNormal),
    /// A sample with no spread; `value` is its only time.
    Degenerate { value: f64 },
}

impl FittedModel {
    /// Percentile score in [0, 100] for a finishing time; faster scores higher.
    pub fn percentile(&self, seconds: f64) -> f64 {
        match self {
            FittedModel::SkewNormal(curve) => (100.0 * curve.sf(seconds)).clamp(0.0, 100.0),
            FittedModel::Degenerate { .. } => DEGENERATE_SCORE,
        }
    }

    pub fn as_skew_normal(&self) -> Option<&SkewNormal> {
        match self {
            FittedModel::SkewNormal(curve) => Some(curve),
            FittedModel::Degenerate { .. } => None,
        }
    }
}

impl Curve for FittedModel {
    /// A point mass has no density; plots get a flat line.
    fn pdf(&self, x: f64) -> f64 {
        match self {
            FittedModel::SkewNormal(curve) => curve.pdf(x),
            FittedModel::Degenerate { .. } => 0.0,
        }
    }

    fn sf(&self, x: f64) -> f64 {
        match self {
            FittedModel::SkewNormal(curve) => curve.sf(x),
            FittedModel::Degenerate { .. } => DEGENERATE_SCORE / 100.0,
        }
    }

    fn isf(&self, q: f64) -> f64 {
        match self {
            FittedModel::SkewNormal(curve) => curve.isf(q),
            FittedModel::Degenerate { value } => *value,
        }
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittedModel::SkewNormal(c) => write!(
                f,
                "skew-normal(location={:.3}, scale={:.3}, shape={:.3})",
                c.location, c.scale, c.shape
            ),
            FittedModel::Degenerate { value } => {
                write!(f, "degenerate(single time {:.3}, fixed score {})", value, DEGENERATE_SCORE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_always_fifty() {
        let model = FittedModel::Degenerate { value: 600.0 };
        assert_eq!(model.percentile(1.0), 50.0);
        assert_eq!(model.percentile(600.0), 50.0);
        assert_eq!(model.percentile(1e9), 50.0);
        assert_eq!(model.isf(0.25), 600.0);
        assert_eq!(model.pdf(600.0), 0.0);
    }

    #[test]
    fn test_percentile_clamped_and_ordered() {
        let model = FittedModel::SkewNormal(SkewNormal::new(600.0, 60.0, 2.0).unwrap());
        let fast = model.percentile(500.0);
        let slow = model.percentile(800.0);
        assert!(fast > slow);
        for x in [-1e9, 0.0, 600.0, 1e9] {
            let p = model.percentile(x);
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn test_serialize_tags_variant() {
        let model = FittedModel::Degenerate { value: 42.0 };
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"kind":"degenerate","value":42.0}"#);

        let curve = FittedModel::SkewNormal(SkewNormal::new(1.0, 2.0, 3.0).unwrap());
        let json = serde_json::to_value(&curve).unwrap();
        assert_eq!(json["kind"], "skew_normal");
        assert_eq!(json["scale"], 2.0);
    }

    #[test]
    fn test_display() {
        let model = FittedModel::Degenerate { value: 600.0 };
        assert!(model.to_string().starts_with("degenerate"));
    }
}
