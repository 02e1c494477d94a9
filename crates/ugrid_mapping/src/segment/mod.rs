//! Mapping between physical points and flat, 1-based solver segment indices.
//!
//! A segment identifies a (cell, layer) pair: `segment = cell_id + layer_index * cell_count`,
//! where `cell_id` is the 1-based id returned by [`Grid::find_cell`] and layer 0 is the top
//! layer. The inverse recovers the cell as `(segment - 1) % cell_count` and the layer as
//! `(segment - 1) / cell_count`.
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::{Grid, CELL_NOT_FOUND};
use crate::vertical::{LayerConfig, LayerDiscretization};

/// Resolves physical locations to segment indices for a grid and a layer stack.
#[derive(Clone, Debug, Default)]
pub struct SegmentIndexMapper {
    grid: Option<Arc<dyn Grid>>,
    layers: Option<LayerDiscretization>,
}

impl SegmentIndexMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper with both a grid and a layer stack.
    pub fn with_grid_and_layers(grid: Arc<dyn Grid>, layers: LayerDiscretization) -> Self {
        Self {
            grid: Some(grid),
            layers: Some(layers),
        }
    }

    pub fn set_grid(&mut self, grid: Arc<dyn Grid>) {
        self.grid = Some(grid);
    }

    pub fn grid(&self) -> Option<&Arc<dyn Grid>> {
        self.grid.as_ref()
    }

    pub fn layers(&self) -> Option<&LayerDiscretization> {
        self.layers.as_ref()
    }

    /// Configures sigma layering. The previous layering is kept when the thicknesses are rejected.
    pub fn set_sigma_layers(&mut self, thicknesses: impl Into<Vec<f64>>) -> Result<()> {
        self.layers = Some(LayerDiscretization::sigma(thicknesses)?);
        Ok(())
    }

    /// Configures Z layering. The previous layering is kept when the input is rejected.
    pub fn set_z_layers(
        &mut self,
        thicknesses: impl Into<Vec<f64>>,
        top: f64,
        bottom: f64,
    ) -> Result<()> {
        self.layers = Some(LayerDiscretization::z_layers(thicknesses, top, bottom)?);
        Ok(())
    }

    /// Replaces the layering with an already validated stack.
    pub fn set_layers(&mut self, layers: LayerDiscretization) {
        self.layers = Some(layers);
    }

    /// Builds and sets the layering described by a [`LayerConfig`].
    pub fn apply_layer_config(&mut self, config: &LayerConfig) -> Result<()> {
        self.layers = Some(config.build()?);
        Ok(())
    }

    /// 1-based id of the cell containing `(x, y)`, or `0` when the point is outside the grid or
    /// lies on a cell edge or vertex.
    pub fn segment_index_2d(&self, x: f64, y: f64) -> Result<usize> {
        Ok(self.require_grid()?.find_cell(x, y, false))
    }

    /// Segment index of the physical point `(x, y, z)`.
    pub fn segment_index(&self, x: f64, y: f64, z: f64) -> Result<usize> {
        let grid = self.require_grid()?;
        let layers = self.require_layers()?;

        let relative_z = layers.map_to_relative_value(z);
        if !(0.0..=1.0).contains(&relative_z) {
            return Err(layers.out_of_range(z));
        }

        let cell_id = grid.find_cell(x, y, false);
        if cell_id == CELL_NOT_FOUND {
            return Err(Error::Lookup(format!(
                "Point ({x}, {y}, {z}) is not within grid or has ambiguous location (on a grid edge or grid vertex)."
            )));
        }

        let layer_index = layers.layer_index(relative_z)?;
        let segment = cell_id + layer_index * grid.cell_count();
        debug!(x, y, z, cell_id, layer_index, segment, "Resolved segment index.");
        Ok(segment)
    }

    /// 0-based cell index of a segment.
    ///
    /// Needs both a grid and a layer stack; segments range over `1..=cell_count * layer_count`.
    pub fn cell_from_segment_index(&self, segment: usize) -> Result<usize> {
        let cell_count = self.check_segment(segment)?;
        Ok((segment - 1) % cell_count)
    }

    /// 0-based layer index (0 = top) of a segment.
    pub fn layer_from_segment_index(&self, segment: usize) -> Result<usize> {
        let cell_count = self.check_segment(segment)?;
        Ok((segment - 1) / cell_count)
    }

    /// Total number of segments, `cell_count * layer_count`, once both are configured.
    pub fn segment_count(&self) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        let layers = self.layers.as_ref()?;
        Some(grid.cell_count() * layers.layer_count())
    }

    fn require_grid(&self) -> Result<&dyn Grid> {
        self.grid.as_deref().ok_or_else(|| {
            Error::InvalidOperation("Cannot determine cell index as no grid was set.".into())
        })
    }

    fn require_layers(&self) -> Result<&LayerDiscretization> {
        self.layers.as_ref().ok_or_else(|| {
            Error::InvalidOperation(
                "Cannot determine cell index as no layer data was provided.".into(),
            )
        })
    }

    /// Validates a segment against `cell_count * layer_count` and returns the cell count.
    fn check_segment(&self, segment: usize) -> Result<usize> {
        let cell_count = self.require_grid()?.cell_count();
        let layer_count = self.require_layers()?.layer_count();
        if cell_count == 0 {
            return Err(Error::InvalidOperation(
                "Cannot map segments on a grid without cells.".into(),
            ));
        }
        let max = cell_count * layer_count;
        if segment == 0 || segment > max {
            return Err(Error::OutOfRange(format!(
                "segment index must be in range [1, {max}], but was {segment}"
            )));
        }
        Ok(cell_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UnstructuredGrid;

    fn mapper(nx: usize, ny: usize, thicknesses: &[f64]) -> SegmentIndexMapper {
        let grid = Arc::new(UnstructuredGrid::regular(nx, ny, 10.0, 10.0));
        let mut mapper = SegmentIndexMapper::new();
        mapper.set_grid(grid);
        mapper.set_sigma_layers(thicknesses.to_vec()).unwrap();
        mapper
    }

    #[test]
    fn missing_grid_is_invalid_operation() {
        let mut mapper = SegmentIndexMapper::new();
        mapper.set_sigma_layers([1.0]).unwrap();
        let err = mapper.segment_index(4.5, 17.8, 0.5).unwrap_err();
        assert_eq!(err.to_string(), "Cannot determine cell index as no grid was set.");
    }

    #[test]
    fn missing_layers_is_invalid_operation() {
        let mut mapper = SegmentIndexMapper::new();
        mapper.set_grid(Arc::new(UnstructuredGrid::regular(2, 2, 10.0, 10.0)));
        let err = mapper.segment_index(4.5, 17.8, 0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot determine cell index as no layer data was provided."
        );
    }

    #[test]
    fn quarter_layers_place_mid_depth_in_second_layer() {
        // 10 cells in one row; x = 25 lies in the third cell.
        let mapper = mapper(10, 1, &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(mapper.segment_index_2d(25.0, 5.0).unwrap(), 3);
        assert_eq!(mapper.segment_index(25.0, 5.0, 0.5).unwrap(), 13);
    }

    #[test]
    fn z_outside_range_reports_physical_bounds() {
        let mut mapper = mapper(2, 2, &[1.0]);
        mapper.set_z_layers([0.5, 0.5], 0.0, -10.0).unwrap();
        let err = mapper.segment_index(5.0, 5.0, -12.0).unwrap_err();
        let Error::OutOfRange(msg) = err else {
            panic!("expected range error");
        };
        assert!(msg.contains("[0, -10]"), "{msg}");
        assert!(msg.contains("Z-layer"), "{msg}");
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut mapper = mapper(2, 2, &[1.0]);
        mapper.set_z_layers([0.5, 0.5], 0.0, -10.0).unwrap();
        assert_eq!(mapper.segment_index(5.0, 5.0, 0.0).unwrap(), 1);
        assert_eq!(mapper.segment_index(5.0, 5.0, -10.0).unwrap(), 5);
    }

    #[test]
    fn point_on_shared_edge_is_lookup_error() {
        let mapper = mapper(2, 2, &[1.0]);
        assert_eq!(mapper.segment_index_2d(10.0, 5.0).unwrap(), 0);
        let err = mapper.segment_index(10.0, 5.0, 0.5).unwrap_err();
        let Error::Lookup(msg) = err else {
            panic!("expected lookup error");
        };
        assert!(msg.contains("ambiguous location"), "{msg}");
    }

    #[test]
    fn rejected_layers_keep_previous_configuration() {
        let mut mapper = mapper(2, 2, &[0.5, 0.5]);
        assert!(mapper.set_sigma_layers([0.3, 0.3]).is_err());
        assert_eq!(mapper.layers().unwrap().layer_count(), 2);
    }

    #[test]
    fn segment_inverse_recovers_cell_and_layer() {
        let mapper = mapper(2, 2, &[0.5, 0.5]);
        assert_eq!(mapper.segment_count(), Some(8));
        assert_eq!(mapper.cell_from_segment_index(7).unwrap(), 2);
        assert_eq!(mapper.layer_from_segment_index(7).unwrap(), 1);
        assert!(matches!(
            mapper.cell_from_segment_index(0),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            mapper.cell_from_segment_index(9),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn segment_inverse_requires_layers() {
        let mut mapper = SegmentIndexMapper::new();
        mapper.set_grid(Arc::new(UnstructuredGrid::regular(2, 2, 10.0, 10.0)));
        for segment in [1, 4, 7] {
            let err = mapper.cell_from_segment_index(segment).unwrap_err();
            assert!(matches!(err, Error::InvalidOperation(_)), "{segment}");
            assert!(mapper.layer_from_segment_index(segment).is_err());
        }
        assert_eq!(mapper.segment_count(), None);

        mapper.set_sigma_layers([0.5, 0.5]).unwrap();
        assert_eq!(mapper.cell_from_segment_index(7).unwrap(), 2);
    }

    #[test]
    fn apply_layer_config_sets_layers() {
        let mut mapper = mapper(1, 1, &[1.0]);
        mapper
            .apply_layer_config(&LayerConfig::z_layers([0.5, 0.5], 1.0, 7.7))
            .unwrap();
        assert!(!mapper.layers().unwrap().is_sigma());
    }
}
