//! Inverse distance weighting engine.
//!
//! Each target value is `sum(w_i * z_i) / sum(w_i)` with `w_i = 1 / d_i^p` over the samples
//! that pass the search radius and neighbour limits. A target closer than
//! `distance_tolerance` to a sample takes that sample's value. Targets with too few
//! neighbours receive `no_data_value`.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coverage::DEFAULT_NO_DATA_VALUE;
use crate::error::{Error, Result};
use crate::grid::LocationKind;
use crate::interpolation::{InterpolationEngine, ProjectionKind, TargetGeometry};
use crate::pointcloud::PointCloud;

/// Mean Earth radius in metres, used for great-circle distances.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Settings of an [`IdwEngine`].
///
/// In spherical mode distances, and therefore `search_radius` and `distance_tolerance`, are in
/// metres along the great circle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct IdwConfig {
    /// Distance exponent, usually between 1 and 3.
    pub power: f64,
    /// Samples farther away are ignored; `None` means unlimited.
    pub search_radius: Option<f64>,
    /// Only the nearest samples are used; `None` means all.
    pub max_neighbors: Option<usize>,
    /// Targets with fewer samples in range receive `no_data_value`.
    pub min_neighbors: usize,
    pub distance_tolerance: f64,
    pub no_data_value: f64,
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self {
            power: 2.0,
            search_radius: None,
            max_neighbors: None,
            min_neighbors: 1,
            distance_tolerance: 1e-10,
            no_data_value: DEFAULT_NO_DATA_VALUE,
        }
    }
}

impl IdwConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = Some(radius);
        self
    }

    pub fn with_max_neighbors(mut self, n: usize) -> Self {
        self.max_neighbors = Some(n);
        self
    }

    pub fn with_min_neighbors(mut self, n: usize) -> Self {
        self.min_neighbors = n;
        self
    }

    pub fn with_distance_tolerance(mut self, tolerance: f64) -> Self {
        self.distance_tolerance = tolerance;
        self
    }

    pub fn with_no_data_value(mut self, no_data_value: f64) -> Self {
        self.no_data_value = no_data_value;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(Error::Configuration("power must be finite and > 0".into()));
        }
        if let Some(r) = self.search_radius {
            if r.is_nan() || r <= 0.0 {
                return Err(Error::Configuration("search_radius must be > 0".into()));
            }
        }
        if self.min_neighbors == 0 {
            return Err(Error::Configuration("min_neighbors must be >= 1".into()));
        }
        if let Some(max) = self.max_neighbors {
            if max < self.min_neighbors {
                return Err(Error::Configuration(format!(
                    "max_neighbors ({max}) must not be below min_neighbors ({})",
                    self.min_neighbors
                )));
            }
        }
        if self.distance_tolerance.is_nan() || self.distance_tolerance < 0.0 {
            return Err(Error::Configuration("distance_tolerance must be >= 0".into()));
        }
        Ok(())
    }
}

/// Inverse distance weighting over all samples, brute force.
#[derive(Debug, Clone, Default)]
pub struct IdwEngine {
    config: IdwConfig,
}

impl IdwEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine after validating `config`.
    pub fn with_config(config: IdwConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IdwConfig {
        &self.config
    }

    fn interpolate_at(
        &self,
        target: DVec2,
        samples: &PointCloud,
        projection: ProjectionKind,
        scratch: &mut Vec<(f64, f64)>,
    ) -> f64 {
        let cfg = &self.config;
        scratch.clear();
        for s in samples {
            let d = distance(target, s.position(), projection);
            if d <= cfg.distance_tolerance {
                return s.value;
            }
            if cfg.search_radius.is_none_or(|r| d <= r) {
                scratch.push((d, s.value));
            }
        }

        if scratch.len() < cfg.min_neighbors {
            return cfg.no_data_value;
        }
        if let Some(max) = cfg.max_neighbors {
            if scratch.len() > max {
                scratch.select_nth_unstable_by(max, |a, b| a.0.total_cmp(&b.0));
                scratch.truncate(max);
            }
        }

        let (mut weight_sum, mut value_sum) = (0.0, 0.0);
        for &(d, v) in scratch.iter() {
            let w = d.powf(-cfg.power);
            weight_sum += w;
            value_sum += w * v;
        }
        if weight_sum > 0.0 {
            value_sum / weight_sum
        } else {
            cfg.no_data_value
        }
    }
}

impl InterpolationEngine for IdwEngine {
    fn interpolate(
        &self,
        samples: &PointCloud,
        target: &TargetGeometry,
        location: LocationKind,
        projection: ProjectionKind,
    ) -> Result<Vec<f64>> {
        if let Some(p) = samples.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::Interpolation(format!(
                "sample at ({}, {}) has non-finite value {}",
                p.x, p.y, p.value
            )));
        }

        debug!(
            samples = samples.len(),
            targets = target.len(),
            %location,
            %projection,
            "Interpolating with inverse distance weighting."
        );

        let mut scratch = Vec::with_capacity(samples.len());
        Ok(target
            .coordinates()
            .iter()
            .map(|&t| self.interpolate_at(t, samples, projection, &mut scratch))
            .collect())
    }
}

/// Distance between two coordinates under the given projection.
pub fn distance(a: DVec2, b: DVec2, projection: ProjectionKind) -> f64 {
    match projection {
        ProjectionKind::Cartesian => a.distance(b),
        ProjectionKind::Spherical => haversine(a, b),
    }
}

/// Great-circle distance between two `(longitude, latitude)` points in degrees.
fn haversine(a: DVec2, b: DVec2) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();
    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin()
}
