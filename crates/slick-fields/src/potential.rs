//! Hazard potential: a sum of Gaussian bumps at sensitivity points.

use serde::{Deserialize, Serialize};
use slick_core::{normalize_intensity, FlyMask, LonLat, Surface};
use slick_space::GridSpec;

/// Default bump width in degrees.
pub const DEFAULT_SIGMA: f64 = 0.1;

/// Default latitude margin, in degrees, for the point pre-filter.
pub const DEFAULT_LAT_MARGIN: f64 = 1.0;

/// A weighted hazard source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    /// Where the hazard sits.
    pub location: LonLat,
    /// Non-negative weight.
    pub value: f64,
}

impl SensitivityPoint {
    /// Create a point.
    pub const fn new(lon: f64, lat: f64, value: f64) -> Self {
        Self {
            location: LonLat::new(lon, lat),
            value,
        }
    }
}

/// Gaussian potential field generator.
///
/// Each grid cell, sampled at its raster point, accumulates
/// `value * exp(-(dlon^2 + dlat^2) / (2 sigma^2))` over every point whose
/// latitude lies in the grid's latitude band widened by `lat_margin`.
/// With the default sigma, a point one degree away contributes about
/// `e^-50` of its weight, so the pre-filter only drops negligible mass.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialField {
    sigma: f64,
    lat_margin: f64,
}

/// Builder for [`PotentialField`]. Both settings have defaults.
#[derive(Clone, Debug)]
pub struct PotentialFieldBuilder {
    sigma: f64,
    lat_margin: f64,
}

impl PotentialField {
    /// Create a new builder.
    pub fn builder() -> PotentialFieldBuilder {
        PotentialFieldBuilder {
            sigma: DEFAULT_SIGMA,
            lat_margin: DEFAULT_LAT_MARGIN,
        }
    }

    /// Bump width in degrees.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Latitude pre-filter margin in degrees.
    pub fn lat_margin(&self) -> f64 {
        self.lat_margin
    }

    /// Unnormalized potential over every cell, masked or not.
    pub fn raw(&self, points: &[SensitivityPoint], grid: &GridSpec) -> Surface {
        let bounds = grid.bounds();
        let near: Vec<&SensitivityPoint> = points
            .iter()
            .filter(|p| bounds.lat_band_contains(p.location.lat, self.lat_margin))
            .collect();
        let two_sigma_sq = 2.0 * self.sigma * self.sigma;

        let values = grid
            .cells()
            .map(|(i, j)| {
                let cell = grid.raster_point(i, j);
                near.iter()
                    .map(|p| p.value * (-cell.distance_sq(&p.location) / two_sigma_sq).exp())
                    .sum()
            })
            .collect();
        Surface::from_values(grid.width(), grid.height(), values)
    }

    /// Normalized potential: `[0, 5]` in flyable cells, `-1` in masked ones.
    ///
    /// Falls back to the mask baseline when no point contributes inside the
    /// fly zone.
    pub fn build(&self, points: &[SensitivityPoint], grid: &GridSpec, mask: &FlyMask) -> Surface {
        normalize_intensity(&self.raw(points, grid), mask)
    }
}

impl Default for PotentialField {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            lat_margin: DEFAULT_LAT_MARGIN,
        }
    }
}

impl PotentialFieldBuilder {
    /// Set the bump width in degrees (default 0.1). Must be finite and > 0.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the latitude pre-filter margin (default 1.0). Must be finite and >= 0.
    pub fn lat_margin(mut self, margin: f64) -> Self {
        self.lat_margin = margin;
        self
    }

    /// Build the generator.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `sigma` is not finite and positive, or `lat_margin`
    /// is not finite and non-negative.
    pub fn build(self) -> Result<PotentialField, String> {
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(format!("sigma must be finite and > 0, got {}", self.sigma));
        }
        if !(self.lat_margin >= 0.0) || !self.lat_margin.is_finite() {
            return Err(format!(
                "lat_margin must be finite and >= 0, got {}",
                self.lat_margin
            ));
        }
        Ok(PotentialField {
            sigma: self.sigma,
            lat_margin: self.lat_margin,
        })
    }
}
