//! Declarative layer settings that build a [`LayerDiscretization`].
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vertical::{LayerDiscretization, LayerType};

/// Layer settings as stored with a model.
///
/// `z_top` and `z_bottom` are only read for [`LayerType::ZLayer`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub layer_type: LayerType,
    pub relative_thicknesses: Vec<f64>,
    pub z_top: f64,
    pub z_bottom: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            layer_type: LayerType::Sigma,
            relative_thicknesses: vec![1.0],
            z_top: 0.0,
            z_bottom: 1.0,
        }
    }
}

impl LayerConfig {
    /// Sigma settings with the given thicknesses.
    pub fn sigma(relative_thicknesses: impl Into<Vec<f64>>) -> Self {
        Self {
            relative_thicknesses: relative_thicknesses.into(),
            ..Default::default()
        }
    }

    /// Z-layer settings with the given thicknesses and bounds.
    pub fn z_layers(relative_thicknesses: impl Into<Vec<f64>>, z_top: f64, z_bottom: f64) -> Self {
        Self {
            layer_type: LayerType::ZLayer,
            relative_thicknesses: relative_thicknesses.into(),
            z_top,
            z_bottom,
        }
    }

    /// Splits the column into `n` layers of equal thickness.
    pub fn with_uniform_layers(mut self, n: usize) -> Self {
        self.relative_thicknesses = vec![1.0 / n.max(1) as f64; n.max(1)];
        self
    }

    /// Sets the Z-layer bounds.
    pub fn with_z_bounds(mut self, z_top: f64, z_bottom: f64) -> Self {
        self.z_top = z_top;
        self.z_bottom = z_bottom;
        self
    }

    /// Validates the settings, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.build().map(|_| ())
    }

    /// Builds the layer stack, applying the same checks as the direct constructors.
    pub fn build(&self) -> Result<LayerDiscretization> {
        match self.layer_type {
            LayerType::Sigma => LayerDiscretization::sigma(self.relative_thicknesses.clone()),
            LayerType::ZLayer => LayerDiscretization::z_layers(
                self.relative_thicknesses.clone(),
                self.z_top,
                self.z_bottom,
            ),
        }
    }
}

impl TryFrom<&LayerConfig> for LayerDiscretization {
    type Error = Error;

    fn try_from(config: &LayerConfig) -> Result<Self> {
        config.build()
    }
}

impl From<&LayerDiscretization> for LayerConfig {
    fn from(layers: &LayerDiscretization) -> Self {
        Self {
            layer_type: layers.layer_type(),
            relative_thicknesses: layers.thicknesses().to_vec(),
            z_top: layers.top(),
            z_bottom: layers.bottom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_sigma_layer() {
        let layers = LayerConfig::default().build().unwrap();
        assert!(layers.is_sigma());
        assert_eq!(layers.layer_count(), 1);
    }

    #[test]
    fn uniform_layers_sum_to_one() {
        let config = LayerConfig::default().with_uniform_layers(7);
        assert_eq!(config.relative_thicknesses.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn z_config_uses_bounds() {
        let config = LayerConfig::z_layers([0.5, 0.5], 0.0, 1.0).with_z_bounds(2.0, -8.0);
        let layers = LayerDiscretization::try_from(&config).unwrap();
        assert_eq!(layers.top(), 2.0);
        assert_eq!(layers.bottom(), -8.0);
        assert_eq!(layers.layer_type(), LayerType::ZLayer);
    }

    #[test]
    fn sigma_config_ignores_z_bounds() {
        let config = LayerConfig::sigma([1.0]).with_z_bounds(5.0, -5.0);
        let layers = config.build().unwrap();
        assert_eq!((layers.top(), layers.bottom()), (0.0, 1.0));
    }

    #[test]
    fn invalid_thicknesses_fail_validation() {
        let err = LayerConfig::sigma([0.2, 0.2]).validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn config_roundtrips_through_layers() {
        let layers = LayerDiscretization::z_layers([0.4, 0.6], 1.0, 7.7).unwrap();
        let config = LayerConfig::from(&layers);
        assert_eq!(config.build().unwrap(), layers);
    }
}
