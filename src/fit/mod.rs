//! Continuum fitting: spline through control points, windowed median for
//! placing them, and division of the spectrum by the result.

pub mod spline;

pub use spline::CubicSpline;

use crate::data::model::ControlPoint;
use crate::error::FitError;

/// Degree of the continuum spline.
pub const SPLINE_DEGREE: usize = 3;

/// A degree-k spline needs k + 1 distinct abscissae.
pub const MIN_DISTINCT_POINTS: usize = SPLINE_DEGREE + 1;

/// Fit the continuum spline through `points`, in any order.
///
/// Points are sorted by x. Points sharing an x value are merged into one knot
/// carrying their mean y.
pub fn fit(points: &[ControlPoint]) -> Result<CubicSpline, FitError> {
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(FitError::DegenerateFit {
            reason: "control point with a non-finite coordinate".to_string(),
        });
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let (xs, ys) = merge_duplicate_x(&sorted);

    if points.len() >= 2 && xs.len() == 1 {
        return Err(FitError::DegenerateFit {
            reason: format!("all {} points share x = {}", points.len(), xs[0]),
        });
    }
    if xs.len() < MIN_DISTINCT_POINTS {
        return Err(FitError::InsufficientPoints {
            distinct: xs.len(),
            required: MIN_DISTINCT_POINTS,
        });
    }

    CubicSpline::not_a_knot(xs, ys).ok_or_else(|| FitError::DegenerateFit {
        reason: "spline system is singular".to_string(),
    })
}

fn merge_duplicate_x(sorted: &[ControlPoint]) -> (Vec<f64>, Vec<f64>) {
    let mut xs: Vec<f64> = Vec::with_capacity(sorted.len());
    let mut ys: Vec<f64> = Vec::with_capacity(sorted.len());
    let mut group = 0usize;

    for p in sorted {
        if xs.last() == Some(&p.x) {
            group += 1;
            let last = ys.len() - 1;
            ys[last] += (p.y - ys[last]) / group as f64;
        } else {
            xs.push(p.x);
            ys.push(p.y);
            group = 1;
        }
    }
    (xs, ys)
}

/// Median of `flux` over samples with `center - half_width <= wavelength <= center + half_width`.
///
/// `None` when no sample falls in the window.
pub fn window_median(wavelength: &[f64], flux: &[f64], center: f64, half_width: f64) -> Option<f64> {
    let lo = center - half_width;
    let hi = center + half_width;
    let mut values: Vec<f64> = wavelength
        .iter()
        .zip(flux)
        .filter(|(&w, _)| lo <= w && w <= hi)
        .map(|(_, &f)| f)
        .collect();

    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some(0.5 * (values[mid - 1] + values[mid]))
    }
}

/// `flux[i] / continuum[i]`; zero continuum yields inf or NaN.
pub fn normalize(flux: &[f64], continuum: &[f64]) -> Vec<f64> {
    flux.iter().zip(continuum).map(|(f, c)| f / c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<ControlPoint> {
        raw.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    #[test]
    fn interpolates_control_points() {
        let spline = fit(&pts(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0), (4.0, 2.0)])).unwrap();
        let values = spline.evaluate(&[1.0, 2.0, 3.0, 4.0]);
        for (v, expected) in values.iter().zip([1.0, 2.0, 1.0, 2.0]) {
            assert!((v - expected).abs() < 1e-10, "{v} vs {expected}");
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = fit(&pts(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0), (4.0, 2.0), (6.0, 1.5)])).unwrap();
        let b = fit(&pts(&[(6.0, 1.5), (3.0, 1.0), (1.0, 1.0), (4.0, 2.0), (2.0, 2.0)])).unwrap();
        let xs: Vec<f64> = (0..70).map(|i| i as f64 * 0.1).collect();
        assert_eq!(a.evaluate(&xs), b.evaluate(&xs));
    }

    #[test]
    fn three_or_fewer_distinct_x_is_insufficient() {
        for raw in [
            vec![],
            vec![(1.0, 1.0)],
            vec![(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)],
            vec![(1.0, 1.0), (2.0, 2.0), (3.0, 1.0), (3.0, 5.0)],
        ] {
            let err = fit(&pts(&raw)).unwrap_err();
            assert!(matches!(err, FitError::InsufficientPoints { required: 4, .. }), "{raw:?}: {err}");
        }
    }

    #[test]
    fn coincident_x_is_degenerate() {
        let err = fit(&pts(&[(2.0, 1.0), (2.0, 2.0), (2.0, 3.0), (2.0, 4.0)])).unwrap_err();
        assert!(matches!(err, FitError::DegenerateFit { .. }));
    }

    #[test]
    fn duplicate_x_is_merged_by_mean() {
        let spline = fit(&pts(&[(1.0, 1.0), (2.0, 1.0), (2.0, 3.0), (3.0, 1.0), (4.0, 2.0)])).unwrap();
        assert_eq!(spline.knots(), &[1.0, 2.0, 3.0, 4.0]);
        assert!((spline.value_at(2.0) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn median_in_window() {
        let w = [1.0, 1.5, 2.0, 2.5, 3.0];
        let f = [10.0, 4.0, 2.0, 8.0, 6.0];
        assert_eq!(window_median(&w, &f, 2.0, 0.5), Some(4.0));
        assert_eq!(window_median(&w, &f, 2.25, 0.5), Some(5.0));
        assert_eq!(window_median(&w, &f, 10.0, 0.5), None);
    }

    #[test]
    fn normalize_divides_and_flags_zero_continuum() {
        let out = normalize(&[2.0, 3.0, 1.0, 0.0], &[2.0, 1.5, 0.0, 0.0]);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 2.0);
        assert!(out[2].is_infinite());
        assert!(out[3].is_nan());
    }
}
