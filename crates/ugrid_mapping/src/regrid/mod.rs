//! Moving coverages between grids: reset or reinterpolation, bathymetry loading, and the
//! per-coverage decision after a model's grid is replaced.
pub mod bathymetry;
pub mod binder;
pub mod update;

pub use bathymetry::{load_bathymetry, load_bathymetry_with_events, vertex_z_values};
pub use binder::CoverageGridBinder;
pub use update::{
    default_bathymetry_source, update_coverage_after_grid_set, GridChange, GridUpdateOptions,
    GridUpdateOutcome, GridUpdater, DEFAULT_BATHYMETRY_NAME,
};
