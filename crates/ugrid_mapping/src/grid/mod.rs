//! Grid port consumed by the mapping and regridding code.
//!
//! The mesh itself is an external collaborator: this crate only needs counts (used as strides
//! in segment arithmetic), cell lookup for a 2D point, coordinate enumeration per location kind,
//! vertex elevations, and the flow-link reordering hook. Implement [`Grid`] for your mesh type,
//! or use [`UnstructuredGrid`] as an in-memory reference implementation.
use std::fmt;

use mint::Vector2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod unstructured;

pub use unstructured::{CellLocation, UnstructuredGrid};

/// Cell id returned by [`Grid::find_cell`] when a point is outside the grid or ambiguous.
pub const CELL_NOT_FOUND: usize = 0;

/// The kind of grid location a coverage is defined on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Vertex,
    Cell,
    FlowLink,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocationKind::Vertex => "vertex",
            LocationKind::Cell => "cell",
            LocationKind::FlowLink => "flow link",
        };
        f.pad(name)
    }
}

/// Read-only view of an unstructured 2D mesh.
pub trait Grid: Send + Sync {
    fn vertex_count(&self) -> usize;

    fn cell_count(&self) -> usize;

    fn flow_link_count(&self) -> usize;

    /// Returns the 1-based id of the cell containing `(x, y)`, or [`CELL_NOT_FOUND`].
    ///
    /// With `include_edges == false` a point on a cell edge or vertex is not assigned to any
    /// cell. Callers cannot tell "outside" from "ambiguous" through this method.
    fn find_cell(&self, x: f64, y: f64, include_edges: bool) -> usize;

    /// Elevation of every vertex, in vertex order.
    fn vertex_z_values(&self) -> Vec<f64>;

    /// Coordinates of every location of the given kind, in location order.
    fn coordinates(&self, location: LocationKind) -> Vec<Vector2<f64>>;

    /// Maps values in the interpolation engine's flow-link order onto this grid's
    /// flow-link numbering.
    fn reorder_flow_link_values(&self, values: &[f64]) -> Vec<f64> {
        values.to_vec()
    }

    /// Whether coordinates are longitude/latitude rather than projected.
    fn is_geographic(&self) -> bool {
        false
    }

    /// Number of locations of the given kind.
    fn location_count(&self, location: LocationKind) -> usize {
        match location {
            LocationKind::Vertex => self.vertex_count(),
            LocationKind::Cell => self.cell_count(),
            LocationKind::FlowLink => self.flow_link_count(),
        }
    }
}

impl fmt::Debug for dyn Grid + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("vertices", &self.vertex_count())
            .field("cells", &self.cell_count())
            .field("flow_links", &self.flow_link_count())
            .field("geographic", &self.is_geographic())
            .finish()
    }
}
