//! Interpolating cubic spline with not-a-knot end conditions.
//!
//! This is the curve FITPACK's `curfit` returns for degree 3 with zero
//! smoothing: knots sit on the data, the first and last interior knots are
//! dropped, so the third derivative is continuous across `x[1]` and `x[n-2]`.
//! With exactly four points it degenerates to the single cubic through them.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Strictly increasing knots.
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Fit through `(xs[i], ys[i])`.
    ///
    /// Returns `None` when fewer than 4 points are given, `xs` is not
    /// strictly increasing, or the system turns out singular.
    pub fn not_a_knot(xs: Vec<f64>, ys: Vec<f64>) -> Option<Self> {
        let n = xs.len();
        if n < 4 || ys.len() != n {
            return None;
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return None;
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // Third-derivative continuity at x[1].
        a[(0, 0)] = h[1];
        a[(0, 1)] = -(h[0] + h[1]);
        a[(0, 2)] = h[0];

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        // Third-derivative continuity at x[n-2].
        a[(n - 1, n - 3)] = h[n - 2];
        a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        a[(n - 1, n - 1)] = h[n - 3];

        let solution = a.lu().solve(&rhs)?;
        if solution.iter().any(|v| !v.is_finite()) {
            return None;
        }

        Some(Self {
            xs,
            ys,
            y2s: solution.iter().copied().collect(),
        })
    }

    pub fn knots(&self) -> &[f64] {
        &self.xs
    }

    /// Evaluate at `x`. Outside the knot span the boundary polynomial is
    /// extended.
    pub fn value_at(&self, x: f64) -> f64 {
        let n = self.xs.len();

        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }

    /// Evaluate at every element of `xs`.
    pub fn evaluate(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.value_at(x)).collect()
    }
}
