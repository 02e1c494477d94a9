//! Vertical layering of a 2D grid into sigma or Z layers.
//!
//! A [`LayerDiscretization`] is an ordered stack of relative thicknesses between a `top` and a
//! `bottom` level. Sigma layering spans `0.0` (top) to `1.0` (bottom) and is independent of the
//! local water depth; Z layering spans arbitrary physical levels. Physical levels are first
//! mapped to a relative position in `[0, 1]` and then to a layer index, counted from the top.
pub mod config;

pub use config::LayerConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Allowed deviation of the thickness sum from `1.0`.
pub const THICKNESS_SUM_TOLERANCE: f64 = 1.01e-3;

/// The kind of vertical layering.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerType {
    Sigma,
    ZLayer,
}

impl LayerType {
    fn label(self) -> &'static str {
        match self {
            LayerType::Sigma => "Sigma",
            LayerType::ZLayer => "Z",
        }
    }
}

/// An immutable stack of layers between `top` and `bottom`.
///
/// Deserialize through [`LayerConfig`] so the thickness checks run.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct LayerDiscretization {
    thicknesses: Vec<f64>,
    top: f64,
    bottom: f64,
}

impl LayerDiscretization {
    /// Sigma layering: `top = 0.0`, `bottom = 1.0`.
    pub fn sigma(thicknesses: impl Into<Vec<f64>>) -> Result<Self> {
        Self::build(thicknesses.into(), 0.0, 1.0, LayerType::Sigma)
    }

    /// Z layering between two physical levels.
    pub fn z_layers(thicknesses: impl Into<Vec<f64>>, top: f64, bottom: f64) -> Result<Self> {
        if !top.is_finite() || !bottom.is_finite() || top == bottom {
            return Err(Error::Configuration(format!(
                "Z layers need two distinct finite levels, but got top {top} and bottom {bottom}."
            )));
        }
        Self::build(thicknesses.into(), top, bottom, LayerType::ZLayer)
    }

    fn build(thicknesses: Vec<f64>, top: f64, bottom: f64, kind: LayerType) -> Result<Self> {
        if thicknesses.is_empty() {
            return Err(Error::Configuration(format!(
                "{} layers need at least one layer thickness.",
                kind.label()
            )));
        }
        if let Some(t) = thicknesses.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(Error::Configuration(format!(
                "{} layer thicknesses must be positive, but found {t}.",
                kind.label()
            )));
        }

        let sum: f64 = thicknesses.iter().sum();
        if (sum - 1.0).abs() > THICKNESS_SUM_TOLERANCE {
            return Err(Error::Configuration(format!(
                "{} layers should add up to ~1.0, but was adding up to {sum}.",
                kind.label()
            )));
        }

        Ok(Self {
            thicknesses,
            top,
            bottom,
        })
    }

    /// Sigma when the stack spans exactly `0.0..=1.0`, Z layering otherwise.
    pub fn layer_type(&self) -> LayerType {
        if self.top == 0.0 && self.bottom == 1.0 {
            LayerType::Sigma
        } else {
            LayerType::ZLayer
        }
    }

    pub fn is_sigma(&self) -> bool {
        self.layer_type() == LayerType::Sigma
    }

    pub fn layer_count(&self) -> usize {
        self.thicknesses.len()
    }

    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Level used when a location has no explicit vertical position.
    pub fn default_z(&self) -> f64 {
        match self.layer_type() {
            LayerType::Sigma => 0.0,
            LayerType::ZLayer => self.top,
        }
    }

    /// Physical level of every layer boundary, from `top` to `bottom` (`layer_count() + 1` values).
    pub fn layer_interfaces(&self) -> Vec<f64> {
        let span = self.bottom - self.top;
        let mut levels = Vec::with_capacity(self.thicknesses.len() + 1);
        levels.push(self.top);
        let mut acc = 0.0;
        for t in &self.thicknesses {
            acc += t;
            levels.push(self.top + acc * span);
        }
        levels
    }

    /// Maps a physical level onto `[0, 1]` relative to `top` and `bottom`.
    ///
    /// Levels outside the stack map outside `[0, 1]`; no clamping is applied.
    #[inline]
    pub fn map_to_relative_value(&self, z: f64) -> f64 {
        (z - self.top) / (self.bottom - self.top)
    }

    /// Whether a physical level lies within the stack, bounds included.
    pub fn contains(&self, z: f64) -> bool {
        (0.0..=1.0).contains(&self.map_to_relative_value(z))
    }

    /// Index (0 = top layer) of the layer containing a relative position.
    ///
    /// Positions on a layer boundary belong to the upper layer. Accumulated thicknesses that
    /// fall slightly short of `1.0` still map `relative_z <= 1.0` onto the last layer.
    pub fn layer_index(&self, relative_z: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&relative_z) {
            return Err(Error::OutOfRange(format!(
                "relative position must be in range [0, 1], but was {relative_z}"
            )));
        }

        let mut distance = 0.0;
        for (i, t) in self.thicknesses.iter().enumerate() {
            distance += t;
            if distance >= relative_z {
                return Ok(i);
            }
        }

        if relative_z <= 1.0 {
            return Ok(self.thicknesses.len() - 1);
        }

        unreachable!("relative position {relative_z} passed the range check but exceeds the stack")
    }

    /// Range error for a physical level, naming the valid range and the layering kind.
    pub(crate) fn out_of_range(&self, z: f64) -> Error {
        let kind = match self.layer_type() {
            LayerType::Sigma => "sigma",
            LayerType::ZLayer => "Z-layer",
        };
        Error::OutOfRange(format!(
            "Height of point must be in range [{}, {}] for {kind} models, but was {z}.",
            self.top, self.bottom
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeated(t: f64, n: usize) -> Vec<f64> {
        vec![t; n]
    }

    #[test]
    fn sigma_spans_zero_to_one() {
        let layers = LayerDiscretization::sigma([0.5, 0.5]).unwrap();
        assert_eq!(layers.top(), 0.0);
        assert_eq!(layers.bottom(), 1.0);
        assert!(layers.is_sigma());
        assert_eq!(layers.default_z(), 0.0);
    }

    #[test]
    fn accepts_sums_within_tolerance() {
        for (t, n) in [(0.999, 1), (0.25, 4), (1.001, 1)] {
            assert!(LayerDiscretization::sigma(repeated(t, n)).is_ok());
            assert!(LayerDiscretization::z_layers(repeated(t, n), 1.0, 7.7).is_ok());
        }
    }

    #[test]
    fn rejects_sums_outside_tolerance_naming_layer_type() {
        for (t, n) in [(0.1, 3), (0.999 - 1e-4, 1), (1.001 + 1e-4, 1), (0.1, 20)] {
            let err = LayerDiscretization::sigma(repeated(t, n)).unwrap_err();
            let Error::Configuration(msg) = err else {
                panic!("expected configuration error");
            };
            assert!(msg.starts_with("Sigma layers should add up to ~1.0"), "{msg}");

            let err = LayerDiscretization::z_layers(repeated(t, n), 1.0, 7.7).unwrap_err();
            let Error::Configuration(msg) = err else {
                panic!("expected configuration error");
            };
            assert!(msg.starts_with("Z layers should add up to ~1.0"), "{msg}");
        }
    }

    #[test]
    fn rejects_empty_and_non_positive_thicknesses() {
        assert!(LayerDiscretization::sigma(Vec::<f64>::new()).is_err());
        assert!(LayerDiscretization::sigma([1.5, -0.5]).is_err());
        assert!(LayerDiscretization::sigma([f64::NAN]).is_err());
        assert!(LayerDiscretization::z_layers([1.0], 3.0, 3.0).is_err());
    }

    #[test]
    fn layer_index_of_bounds_is_first_and_last() {
        for stack in [
            vec![1.0],
            vec![0.25, 0.25, 0.25, 0.25],
            vec![0.3333, 0.3333, 0.3333],
            vec![0.1; 10],
            vec![0.7, 0.2, 0.1005],
        ] {
            let n = stack.len();
            let layers = LayerDiscretization::sigma(stack).unwrap();
            assert_eq!(layers.layer_index(0.0).unwrap(), 0);
            assert_eq!(layers.layer_index(1.0).unwrap(), n - 1);
        }
    }

    #[test]
    fn layer_index_assigns_boundaries_to_upper_layer() {
        let layers = LayerDiscretization::sigma([0.25, 0.25, 0.25, 0.25]).unwrap();
        assert_eq!(layers.layer_index(0.25).unwrap(), 0);
        assert_eq!(layers.layer_index(0.5).unwrap(), 1);
        assert_eq!(layers.layer_index(0.5000001).unwrap(), 2);
    }

    #[test]
    fn layer_index_tolerates_short_stack() {
        // Sums to 0.9999; 1.0 is never reached by accumulation.
        let layers = LayerDiscretization::sigma([0.3333, 0.3333, 0.3333]).unwrap();
        assert_eq!(layers.layer_index(0.99995).unwrap(), 2);
    }

    #[test]
    fn layer_index_rejects_out_of_range() {
        let layers = LayerDiscretization::sigma([1.0]).unwrap();
        assert!(matches!(layers.layer_index(-1e-9), Err(Error::OutOfRange(_))));
        assert!(matches!(layers.layer_index(1.0 + 1e-9), Err(Error::OutOfRange(_))));
        assert!(matches!(layers.layer_index(f64::NAN), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn map_to_relative_value_handles_downward_z() {
        let layers = LayerDiscretization::z_layers([0.5, 0.5], 0.0, -10.0).unwrap();
        assert_eq!(layers.map_to_relative_value(0.0), 0.0);
        assert_eq!(layers.map_to_relative_value(-5.0), 0.5);
        assert_eq!(layers.map_to_relative_value(-10.0), 1.0);
        assert!(layers.map_to_relative_value(-12.0) > 1.0);
        assert!(!layers.contains(-12.0));
        assert_eq!(layers.layer_type(), LayerType::ZLayer);
        assert_eq!(layers.default_z(), 0.0);
    }

    #[test]
    fn layer_interfaces_span_top_to_bottom() {
        let layers = LayerDiscretization::z_layers([0.25, 0.75], 2.0, -2.0).unwrap();
        assert_eq!(layers.layer_interfaces(), vec![2.0, 1.0, -2.0]);
    }

    #[test]
    fn out_of_range_error_names_kind_and_range() {
        let z = LayerDiscretization::z_layers([1.0], 1.0, 7.7).unwrap();
        let msg = z.out_of_range(12.34).to_string();
        assert!(msg.contains("[1, 7.7]"), "{msg}");
        assert!(msg.contains("Z-layer"), "{msg}");

        let sigma = LayerDiscretization::sigma([1.0]).unwrap();
        let msg = sigma.out_of_range(4.8).to_string();
        assert!(msg.contains("[0, 1] for sigma"), "{msg}");
    }
}
