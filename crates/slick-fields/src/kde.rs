//! Two-dimensional Gaussian kernel density estimation.
//!
//! The kernel covariance is the unbiased sample covariance of the data
//! scaled by `factor^2` (a fixed bandwidth factor, as in Scott/Silverman
//! style estimators with a user-chosen factor). Every sample carries equal
//! weight and the density integrates to one.

use std::f64::consts::PI;

use slick_core::{LonLat, ParticleSet};

/// Relative determinant below which the kernel covariance is treated as
/// singular.
const SINGULAR_EPS: f64 = 1e-12;

/// A fitted 2D Gaussian KDE.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKde {
    points: Vec<LonLat>,
    /// Inverse kernel covariance, `[a, b, b, d]` packed as `(a, b, d)`.
    inv: (f64, f64, f64),
    norm: f64,
    regularized: bool,
}

impl GaussianKde {
    /// Fit a KDE to `data` with bandwidth factor `factor`.
    ///
    /// When the kernel covariance is singular (a single sample, or samples
    /// on a line) it is widened by an isotropic `floor_std^2` on both axes
    /// so the estimate stays finite. Returns `None` for empty input or a
    /// non-positive factor.
    pub fn fit(data: &ParticleSet, factor: f64, floor_std: f64) -> Option<Self> {
        let n = data.len();
        if n == 0 || !(factor > 0.0) || !factor.is_finite() {
            return None;
        }
        let points: Vec<LonLat> = data.iter().collect();

        let (mut sxx, mut sxy, mut syy) = covariance(&points);
        let f2 = factor * factor;
        sxx *= f2;
        sxy *= f2;
        syy *= f2;

        let mut det = sxx * syy - sxy * sxy;
        let scale = (sxx.abs() + syy.abs()).max(f64::MIN_POSITIVE);
        let regularized = !(det.is_finite() && det > SINGULAR_EPS * scale * scale);
        if regularized {
            let floor = (floor_std * floor_std).max(f64::MIN_POSITIVE);
            sxx += floor;
            syy += floor;
            det = sxx * syy - sxy * sxy;
        }

        let inv = (syy / det, -sxy / det, sxx / det);
        let norm = 1.0 / (2.0 * PI * det.sqrt() * n as f64);
        Some(Self {
            points,
            inv,
            norm,
            regularized,
        })
    }

    /// Number of samples in the fit.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the fit holds no samples. Never true for a fitted KDE.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the isotropic floor was applied.
    pub fn is_regularized(&self) -> bool {
        self.regularized
    }

    /// Density at `at`.
    pub fn evaluate(&self, at: &LonLat) -> f64 {
        let (a, b, d) = self.inv;
        let sum: f64 = self
            .points
            .iter()
            .map(|p| {
                let dx = at.lon - p.lon;
                let dy = at.lat - p.lat;
                let m = a * dx * dx + 2.0 * b * dx * dy + d * dy * dy;
                (-0.5 * m).exp()
            })
            .sum();
        sum * self.norm
    }
}

/// Unbiased sample covariance `(var_x, cov_xy, var_y)`; zero for one sample.
fn covariance(points: &[LonLat]) -> (f64, f64, f64) {
    let n = points.len();
    if n < 2 {
        return (0.0, 0.0, 0.0);
    }
    let nf = n as f64;
    let mx = points.iter().map(|p| p.lon).sum::<f64>() / nf;
    let my = points.iter().map(|p| p.lat).sum::<f64>() / nf;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.lon - mx;
        let dy = p.lat - my;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let ddof = nf - 1.0;
    (sxx / ddof, sxy / ddof, syy / ddof)
}
