//! Zero-noise extrapolation.
//!
//! Measured values at known noise scales are fitted with a straight line and
//! evaluated at scale 0. With exactly two points this is the Richardson
//! formula
//!
//! ```text
//! p0 = p1 + (p1 - p2) * s1 / (s2 - s1)
//! ```
//!
//! and with more points an ordinary least-squares fit.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ExtrapolationError;

/// Estimates within this distance of 0 or 1 count as saturated.
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// The estimate reaches or leaves `[0, 1]`.
///
/// Extrapolation can overshoot the physical range; the value is reported
/// unchanged and this marker is attached instead. An estimate sitting on a
/// boundary, within [`BOUNDARY_TOLERANCE`], is flagged as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutOfRangeWarning {
    /// The out-of-range estimate.
    pub value: f64,
}

impl std::fmt::Display for OutOfRangeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "estimate {} is at or outside the [0, 1] boundary", self.value)
    }
}

/// A zero-noise estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Extrapolated value at scale 0.
    pub value: f64,
    /// Coefficient of determination of the fit. Exactly 1 for two points.
    pub fit_quality: f64,
    /// The `(scale, value)` points that were fitted.
    pub points: Vec<(f64, f64)>,
    /// Set when `value` reaches or leaves `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<OutOfRangeWarning>,
}

/// Two-point Richardson extrapolation to scale 0.
pub fn richardson(s1: f64, p1: f64, s2: f64, p2: f64) -> Result<f64, ExtrapolationError> {
    if s1 == s2 {
        return Err(ExtrapolationError::DegenerateScales(s1));
    }
    Ok(p1 + (p1 - p2) * s1 / (s2 - s1))
}

/// Least-squares line through `points`, returning `(intercept, r_squared)`.
///
/// Requires at least two distinct scales.
pub fn least_squares(points: &[(f64, f64)]) -> Result<(f64, f64), ExtrapolationError> {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return Err(ExtrapolationError::DegenerateScales(
            points.first().map_or(0.0, |p| p.0),
        ));
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_tot: f64 = points.iter().map(|(_, y)| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };

    Ok((intercept, r_squared))
}

/// Extrapolate `(scale, value)` points to zero noise.
///
/// Points must be non-empty, finite, and strictly increasing in scale. A
/// single point is returned as-is. Two points use [`richardson`]; more use
/// [`least_squares`].
///
/// ```
/// use qmit_mitigate::extrapolate;
///
/// let est = extrapolate(&[(1.0, 0.6), (3.0, 0.5)]).unwrap();
/// assert!((est.value - 0.65).abs() < 1e-12);
/// assert!(est.warning.is_none());
///
/// let saturated = extrapolate(&[(1.0, 0.9), (3.0, 0.7)]).unwrap();
/// assert!(saturated.warning.is_some());
/// ```
pub fn extrapolate(points: &[(f64, f64)]) -> Result<Estimate, ExtrapolationError> {
    if points.is_empty() {
        return Err(ExtrapolationError::Empty);
    }
    for &(scale, value) in points {
        if !scale.is_finite() || !value.is_finite() {
            return Err(ExtrapolationError::NonFinite { scale, value });
        }
    }
    for pair in points.windows(2) {
        let (previous, next) = (pair[0].0, pair[1].0);
        if previous == next {
            return Err(ExtrapolationError::DegenerateScales(next));
        }
        if next < previous {
            return Err(ExtrapolationError::UnorderedScales { previous, next });
        }
    }

    let (value, fit_quality) = match points {
        [(_, p)] => (*p, 1.0),
        [(s1, p1), (s2, p2)] => (richardson(*s1, *p1, *s2, *p2)?, 1.0),
        _ => least_squares(points)?,
    };

    let warning = if in_open_range(value) {
        None
    } else {
        warn!("Extrapolated value {value} is at or outside the [0, 1] boundary");
        Some(OutOfRangeWarning { value })
    };

    Ok(Estimate {
        value,
        fit_quality,
        points: points.to_vec(),
        warning,
    })
}

fn in_open_range(value: f64) -> bool {
    value > BOUNDARY_TOLERANCE && value < 1.0 - BOUNDARY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_two_point_exactness() {
        let est = extrapolate(&[(1.0, 0.6), (3.0, 0.5)]).unwrap();
        assert!(approx_eq(est.value, 0.65));
        assert!(approx_eq(est.fit_quality, 1.0));
    }

    #[test]
    fn test_degenerate_scales() {
        assert_eq!(
            extrapolate(&[(2.0, 0.4), (2.0, 0.5)]),
            Err(ExtrapolationError::DegenerateScales(2.0))
        );
        assert!(richardson(2.0, 0.4, 2.0, 0.5).is_err());
    }

    #[test]
    fn test_unordered_and_empty() {
        assert_eq!(extrapolate(&[]), Err(ExtrapolationError::Empty));
        assert!(matches!(
            extrapolate(&[(3.0, 0.5), (1.0, 0.6)]),
            Err(ExtrapolationError::UnorderedScales { .. })
        ));
        assert!(matches!(
            extrapolate(&[(1.0, f64::NAN), (3.0, 0.6)]),
            Err(ExtrapolationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_single_point_passthrough() {
        let est = extrapolate(&[(1.0, 0.42)]).unwrap();
        assert!(approx_eq(est.value, 0.42));
    }

    #[test]
    fn test_out_of_range_reported_as_is() {
        // 0.9 + (0.9 - 0.6) / 2 = 1.05
        let est = extrapolate(&[(1.0, 0.9), (3.0, 0.6)]).unwrap();
        assert!(approx_eq(est.value, 1.05));
        assert_eq!(est.warning, Some(OutOfRangeWarning { value: est.value }));

        let low = extrapolate(&[(1.0, 0.05), (3.0, 0.3)]).unwrap();
        assert!(low.value < 0.0);
        assert!(low.warning.is_some());
    }

    #[test]
    fn test_boundary_value_flagged() {
        // 0.9 + 0.2 * 0.5 lands on 1.0, up to rounding
        let est = extrapolate(&[(1.0, 0.9), (3.0, 0.7)]).unwrap();
        assert!(approx_eq(est.value, 1.0));
        assert_eq!(est.warning, Some(OutOfRangeWarning { value: est.value }));

        let zero = extrapolate(&[(1.0, 0.1), (3.0, 0.3)]).unwrap();
        assert!(approx_eq(zero.value, 0.0));
        assert!(zero.warning.is_some());
    }

    #[test]
    fn test_interior_values_not_flagged() {
        for value in [1e-6, 0.5, 1.0 - 1e-6] {
            assert!(extrapolate(&[(1.0, value)]).unwrap().warning.is_none());
        }
    }

    #[test]
    fn test_least_squares_linear_data() {
        // y = 0.8 - 0.05 x
        let points = [(1.0, 0.75), (3.0, 0.65), (5.0, 0.55)];
        let est = extrapolate(&points).unwrap();
        assert!(approx_eq(est.value, 0.8));
        assert!(approx_eq(est.fit_quality, 1.0));
    }

    #[test]
    fn test_least_squares_noisy_data() {
        let points = [(1.0, 0.74), (3.0, 0.67), (5.0, 0.54)];
        let (intercept, r2) = least_squares(&points).unwrap();
        assert!(r2 < 1.0 && r2 > 0.9);
        let est = extrapolate(&points).unwrap();
        assert!(approx_eq(est.value, intercept));
    }

    #[test]
    fn test_least_squares_matches_richardson_for_two_points() {
        let points = [(1.0, 0.8), (3.0, 0.62)];
        let (intercept, _) = least_squares(&points).unwrap();
        let r = richardson(1.0, 0.8, 3.0, 0.62).unwrap();
        assert!((intercept - r).abs() < 1e-12);
    }
}
