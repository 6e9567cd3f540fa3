//! Natural cubic spline interpolation for easing curves.
//!
//! Second derivatives are solved once at construction (tridiagonal system,
//! zero curvature at both ends), so sampling is a binary search plus a
//! handful of multiplications.

use crate::{LyricMotionError, Result};

/// Natural cubic spline through a small set of control points.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve {
    xs: Vec<f32>,
    ys: Vec<f32>,
    second_derivatives: Vec<f32>,
}

impl SplineCurve {
    /// Builds a spline from strictly ascending `xs` and matching `ys`.
    ///
    /// At least three control points are required.
    pub fn new(xs: &[f32], ys: &[f32]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(LyricMotionError::InvalidCurve(
                "abscissas and ordinates differ in length",
            ));
        }
        if xs.len() < 3 {
            return Err(LyricMotionError::InvalidCurve(
                "at least three control points are required",
            ));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(LyricMotionError::InvalidCurve(
                "control points must be finite",
            ));
        }
        if xs.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(LyricMotionError::InvalidCurve(
                "abscissas must be strictly ascending",
            ));
        }

        Ok(Self::from_validated(xs, ys))
    }

    /// Builds a spline from `(x, y)` pairs.
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self> {
        let (xs, ys): (Vec<f32>, Vec<f32>) = points.iter().copied().unzip();
        Self::new(&xs, &ys)
    }

    /// Skips validation; callers guarantee at least two strictly ascending,
    /// finite abscissas of the same length as `ys`.
    pub(crate) fn from_validated(xs: &[f32], ys: &[f32]) -> Self {
        let second_derivatives = natural_second_derivatives(xs, ys);
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivatives,
        }
    }

    /// Evaluates the spline at `x`. Outside the control range the nearest
    /// end segment is extended.
    pub fn at(&self, x: f32) -> f32 {
        let last_segment = self.xs.len().saturating_sub(2);
        let segment = self
            .xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(last_segment);

        let (x0, x1) = (self.xs[segment], self.xs[segment + 1]);
        let (y0, y1) = (self.ys[segment], self.ys[segment + 1]);
        let (m0, m1) = (
            self.second_derivatives[segment],
            self.second_derivatives[segment + 1],
        );

        let h = x1 - x0;
        if h <= 0.0 {
            return y0;
        }

        let b = (x - x0) / h;
        let a = 1.0 - b;
        a * y0 + b * y1 + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * (h * h) / 6.0
    }

    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    pub fn ys(&self) -> &[f32] {
        &self.ys
    }

    pub fn second_derivatives(&self) -> &[f32] {
        &self.second_derivatives
    }
}

/// Thomas algorithm over the interior knots; both ends stay at zero.
fn natural_second_derivatives(xs: &[f32], ys: &[f32]) -> Vec<f32> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }

    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    for i in 1..n - 1 {
        let h_prev = xs[i] - xs[i - 1];
        let h_next = xs[i + 1] - xs[i];
        let slope_delta = (ys[i + 1] - ys[i]) / h_next - (ys[i] - ys[i - 1]) / h_prev;

        let diagonal = 2.0 * (h_prev + h_next) - h_prev * upper[i - 1];
        upper[i] = h_next / diagonal;
        rhs[i] = (6.0 * slope_delta - h_prev * rhs[i - 1]) / diagonal;
    }

    for i in (1..n - 1).rev() {
        m[i] = rhs[i] - upper[i] * m[i + 1];
    }

    m
}
