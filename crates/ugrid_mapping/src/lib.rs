#![forbid(unsafe_code)]
//! ugrid_mapping: segment mapping and coverage regridding for layered unstructured grids.
//!
//! Modules:
//! - grid: the grid port and an in-memory reference grid
//! - vertical: sigma and Z-layer discretizations
//! - segment: point to solver segment index mapping and its inverse
//! - coverage: scalar fields over grid locations, edit sessions, events
//! - pointcloud: coverage to sample conversion
//! - interpolation: engine port and an inverse distance weighting engine
//! - regrid: grid rebinding, bathymetry loading, grid-change dispatch
//!
//! For examples, see the README and the `ugrid_mapping_examples` crate.
pub mod coverage;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod pointcloud;
pub mod regrid;
pub mod segment;
pub mod vertical;

/// Convenient re-exports for common types. Import with `use ugrid_mapping::prelude::*;`.
pub mod prelude {
    pub use crate::coverage::{
        Component, ComponentValues, Coverage, CoverageEvent, CoverageEventKind, EditSession,
        EventSink, FilterSink, FnSink, ValueType, VecSink, DEFAULT_NO_DATA_VALUE,
    };
    pub use crate::error::{Error, Result};
    pub use crate::grid::{CellLocation, Grid, LocationKind, UnstructuredGrid, CELL_NOT_FOUND};
    pub use crate::interpolation::{
        IdwConfig, IdwEngine, InterpolationEngine, ProjectionKind, TargetGeometry,
    };
    pub use crate::pointcloud::{to_point_cloud, PointCloud, PointValue};
    pub use crate::regrid::{
        default_bathymetry_source, load_bathymetry, load_bathymetry_with_events,
        update_coverage_after_grid_set, vertex_z_values, CoverageGridBinder, GridChange,
        GridUpdateOptions, GridUpdateOutcome, GridUpdater, DEFAULT_BATHYMETRY_NAME,
    };
    pub use crate::segment::SegmentIndexMapper;
    pub use crate::vertical::{LayerConfig, LayerDiscretization, LayerType};
}
