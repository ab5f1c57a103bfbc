use serde::Serialize;
use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_1_SQRT_2, LN_2, PI};

/// ln(sqrt(2 * pi))
pub(crate) const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Simpson panels used for Owen's T on [0, a], a <= 1.
const OWENS_T_PANELS: usize = 128;

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x - LN_SQRT_2PI).exp()
}

/// ln of the standard normal CDF, stable far into the left tail.
pub fn ln_norm_cdf(x: f64) -> f64 {
    if x > -30.0 {
        norm_cdf(x).ln()
    } else {
        // Mills ratio asymptote: Phi(x) ~ phi(x) / -x
        -0.5 * x * x - (-x).ln() - LN_SQRT_2PI
    }
}

/// Owen's T function T(h, a).
///
/// T is even in h and odd in a. For |a| <= 1 the defining integral is
/// evaluated directly; larger |a| goes through the reflection
/// T(h, a) + T(ah, 1/a) = Q(h)/2 + Q(ah)/2 - Q(h)Q(ah), where Q = 1 - Phi.
pub fn owens_t(h: f64, a: f64) -> f64 {
    if a == 0.0 || h.is_nan() || a.is_nan() {
        return 0.0;
    }
    if a < 0.0 {
        return -owens_t(h, -a);
    }

    let h = h.abs();
    if h == 0.0 {
        return a.atan() / (2.0 * PI);
    }
    if a.is_infinite() {
        return 0.5 * norm_cdf(-h);
    }
    if a <= 1.0 {
        return owens_t_integral(h, a);
    }

    let ah = a * h;
    let q_h = norm_cdf(-h);
    let q_ah = norm_cdf(-ah);
    0.5 * q_h + 0.5 * q_ah - q_h * q_ah - owens_t_integral(ah, 1.0 / a)
}

/// exp(-h^2/2) / 2pi * integral_0^a exp(-h^2 x^2 / 2) / (1 + x^2) dx
fn owens_t_integral(h: f64, a: f64) -> f64 {
    let scale = (-0.5 * h * h).exp() / (2.0 * PI);
    if scale == 0.0 {
        return 0.0;
    }

    let f = |x: f64| (-0.5 * h * h * x * x).exp() / (1.0 + x * x);
    let step = a / OWENS_T_PANELS as f64;
    let mut sum = f(0.0) + f(a);
    for i in 1..OWENS_T_PANELS {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(i as f64 * step);
    }

    scale * sum * step / 3.0
}

/// Skew-normal distribution with location, scale (> 0) and shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkewNormal {
    pub location: f64,
    pub scale: f64,
    pub shape: f64,
}

impl SkewNormal {
    /// Returns `None` unless every parameter is finite and scale is positive.
    pub fn new(location: f64, scale: f64, shape: f64) -> Option<Self> {
        if location.is_finite() && scale.is_finite() && scale > 0.0 && shape.is_finite() {
            Some(Self {
                location,
                scale,
                shape,
            })
        } else {
            None
        }
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.location) / self.scale
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        2.0 / self.scale * norm_pdf(z) * norm_cdf(self.shape * z)
    }

    pub fn log_pdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        LN_2 - self.scale.ln() - 0.5 * z * z - LN_SQRT_2PI + ln_norm_cdf(self.shape * z)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        (norm_cdf(z) - 2.0 * owens_t(z, self.shape)).clamp(0.0, 1.0)
    }

    /// Survival function, 1 - CDF, computed without the subtraction.
    pub fn sf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        (norm_cdf(-z) + 2.0 * owens_t(z, self.shape)).clamp(0.0, 1.0)
    }

    /// Inverse survival function: the x with sf(x) == q.
    ///
    /// q <= 0 maps to +inf and q >= 1 to -inf. Solved by bracketing then
    /// bisection, so the result is reproducible for a given q.
    pub fn isf(&self, q: f64) -> f64 {
        if q.is_nan() {
            return f64::NAN;
        }
        if q <= 0.0 {
            return f64::INFINITY;
        }
        if q >= 1.0 {
            return f64::NEG_INFINITY;
        }

        let mut width = self.scale;
        let mut lo = self.location - width;
        let mut hi = self.location + width;
        for _ in 0..1024 {
            if self.sf(lo) >= q {
                break;
            }
            width *= 2.0;
            lo -= width;
        }
        width = self.scale;
        for _ in 0..1024 {
            if self.sf(hi) <= q {
                break;
            }
            width *= 2.0;
            hi += width;
        }

        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if hi - lo <= 1e-12 * mid.abs().max(1.0) {
                break;
            }
            if self.sf(mid) > q {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_norm_cdf_known_values() {
        assert!(close(norm_cdf(0.0), 0.5, 1e-12));
        assert!(close(norm_cdf(1.959_963_984_540_054), 0.975, 1e-9));
        assert!(close(norm_cdf(-1.0), 0.158_655_253_931_457, 1e-9));
    }

    #[test]
    fn test_ln_norm_cdf_continuous_at_switch() {
        let inside = norm_cdf(-29.999).ln();
        let outside = ln_norm_cdf(-30.001);
        assert!(close(inside, outside, 0.01));
        assert!(ln_norm_cdf(-1000.0).is_finite());
    }

    #[test]
    fn test_owens_t_known_values() {
        // T(0, a) = atan(a) / 2pi
        assert!(close(owens_t(0.0, 1.0), 0.125, 1e-12));
        // T(h, 1) = Phi(h) (1 - Phi(h)) / 2
        let h: f64 = 0.7;
        let expected = 0.5 * norm_cdf(h) * norm_cdf(-h);
        assert!(close(owens_t(h, 1.0), expected, 1e-9));
        // Reference value T(0.5, 0.5)
        assert!(close(owens_t(0.5, 0.5), 0.064_488_602_847_5, 1e-8));
    }

    #[test]
    fn test_owens_t_symmetry() {
        assert!(close(owens_t(-0.8, 2.5), owens_t(0.8, 2.5), 1e-15));
        assert!(close(owens_t(0.8, -2.5), -owens_t(0.8, 2.5), 1e-15));
    }

    #[test]
    fn test_owens_t_large_a_matches_limit() {
        let h = 1.3;
        assert!(close(owens_t(h, 1e6), 0.5 * norm_cdf(-h), 1e-7));
    }

    #[test]
    fn test_zero_shape_is_normal() {
        let sn = SkewNormal::new(10.0, 2.0, 0.0).unwrap();
        assert!(close(sn.cdf(10.0), 0.5, 1e-12));
        assert!(close(sn.sf(12.0), norm_cdf(-1.0), 1e-12));
        assert!(close(sn.pdf(10.0), norm_pdf(0.0) / 2.0, 1e-12));
    }

    #[test]
    fn test_cdf_plus_sf_is_one() {
        let sn = SkewNormal::new(600.0, 90.0, 4.0).unwrap();
        for x in [450.0, 580.0, 600.0, 640.0, 700.0, 900.0] {
            assert!(close(sn.cdf(x) + sn.sf(x), 1.0, 1e-9));
        }
    }

    #[test]
    fn test_sf_against_half_normal_limit() {
        // Large shape approaches a half-normal starting at location.
        let sn = SkewNormal::new(0.0, 1.0, 1e6).unwrap();
        assert!(close(sn.sf(1.0), 2.0 * norm_cdf(-1.0), 1e-6));
        assert!(close(sn.sf(-0.5), 1.0, 1e-9));
    }

    #[test]
    fn test_pdf_integrates_to_one() {
        let sn = SkewNormal::new(5.0, 1.5, -3.0).unwrap();
        let (lo, hi, n) = (-10.0, 20.0, 6000);
        let step = (hi - lo) / n as f64;
        let total: f64 = (0..n)
            .map(|i| sn.pdf(lo + (i as f64 + 0.5) * step) * step)
            .sum();
        assert!(close(total, 1.0, 1e-6));
    }

    #[test]
    fn test_log_pdf_matches_pdf() {
        let sn = SkewNormal::new(1.0, 0.5, 2.0).unwrap();
        for x in [0.5, 1.0, 1.7] {
            assert!(close(sn.log_pdf(x), sn.pdf(x).ln(), 1e-10));
        }
    }

    #[test]
    fn test_isf_inverts_sf() {
        let sn = SkewNormal::new(700.0, 120.0, 3.5).unwrap();
        for q in [0.999_999, 0.75, 0.5, 0.25, 0.000_001] {
            let x = sn.isf(q);
            assert!(close(sn.sf(x), q, 1e-9), "q={} x={}", q, x);
        }
    }

    #[test]
    fn test_isf_bounds() {
        let sn = SkewNormal::new(0.0, 1.0, 1.0).unwrap();
        assert_eq!(sn.isf(0.0), f64::INFINITY);
        assert_eq!(sn.isf(1.0), f64::NEG_INFINITY);
        assert!(sn.isf(f64::NAN).is_nan());
    }

    #[test]
    fn test_new_rejects_bad_scale() {
        assert!(SkewNormal::new(0.0, 0.0, 1.0).is_none());
        assert!(SkewNormal::new(0.0, -1.0, 1.0).is_none());
        assert!(SkewNormal::new(f64::NAN, 1.0, 1.0).is_none());
    }
}
