//! Property-based tests for zero-noise extrapolation.

use proptest::prelude::*;
use qmit_mitigate::{
    BOUNDARY_TOLERANCE, ExtrapolationError, extrapolate, least_squares, richardson,
};

/// Strictly increasing odd scale factors starting at 1.
fn arb_scales() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(1_u32..10, 1..5).prop_map(|steps| {
        std::iter::once(1.0)
            .chain(steps.into_iter().map(|k| f64::from(2 * k + 1)))
            .collect()
    })
}

/// Slopes bounded away from zero so the fit quality stays well conditioned.
fn arb_slope() -> impl Strategy<Value = f64> {
    prop_oneof![-0.2_f64..-0.01, 0.01_f64..0.2]
}

fn on_line(scales: &[f64], intercept: f64, slope: f64) -> Vec<(f64, f64)> {
    scales.iter().map(|&s| (s, intercept + slope * s)).collect()
}

proptest! {
    #[test]
    fn linear_data_recovers_intercept(
        scales in arb_scales(),
        intercept in -0.5_f64..1.5,
        slope in arb_slope(),
    ) {
        let est = extrapolate(&on_line(&scales, intercept, slope)).unwrap();
        prop_assert!((est.value - intercept).abs() < 1e-9);
        prop_assert!((est.fit_quality - 1.0).abs() < 1e-9);
        prop_assert_eq!(est.points.len(), scales.len());
    }

    #[test]
    fn two_point_fit_matches_richardson(
        s2 in 2_u32..20,
        p1 in 0.0_f64..1.0,
        p2 in 0.0_f64..1.0,
    ) {
        let s2 = f64::from(s2);
        let r = richardson(1.0, p1, s2, p2).unwrap();
        let (intercept, _) = least_squares(&[(1.0, p1), (s2, p2)]).unwrap();
        prop_assert!((r - intercept).abs() < 1e-9);
        prop_assert!((extrapolate(&[(1.0, p1), (s2, p2)]).unwrap().value - r).abs() < 1e-12);
    }

    #[test]
    fn warning_marks_values_off_the_open_interval(
        scales in arb_scales(),
        intercept in -0.5_f64..1.5,
        slope in arb_slope(),
    ) {
        let est = extrapolate(&on_line(&scales, intercept, slope)).unwrap();
        let inside = est.value > BOUNDARY_TOLERANCE && est.value < 1.0 - BOUNDARY_TOLERANCE;
        prop_assert_eq!(est.warning.is_none(), inside);
        if let Some(warning) = est.warning {
            prop_assert_eq!(warning.value, est.value);
        }
    }

    #[test]
    fn single_point_passes_through(value in 0.0_f64..=1.0) {
        let est = extrapolate(&[(1.0, value)]).unwrap();
        prop_assert_eq!(est.value, value);
        prop_assert_eq!(est.fit_quality, 1.0);
    }

    #[test]
    fn reversed_scales_rejected(scales in arb_scales(), value in 0.0_f64..1.0) {
        let reversed: Vec<(f64, f64)> = scales.iter().rev().map(|&s| (s, value)).collect();
        let is_unordered = matches!(
            extrapolate(&reversed),
            Err(ExtrapolationError::UnorderedScales { .. })
        );
        prop_assert!(is_unordered);
    }

    #[test]
    fn repeated_scale_rejected(scales in arb_scales(), value in 0.0_f64..1.0) {
        let mut points: Vec<(f64, f64)> = scales.iter().map(|&s| (s, value)).collect();
        let last = points[points.len() - 1];
        points.push(last);
        prop_assert_eq!(
            extrapolate(&points).unwrap_err(),
            ExtrapolationError::DegenerateScales(last.0)
        );
    }
}
