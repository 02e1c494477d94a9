//! Loading elevation values into a bed-level coverage.
use std::sync::Arc;

use tracing::warn;

use crate::coverage::events::EventSink;
use crate::coverage::Coverage;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Elevation source reading the grid's own vertex z-values.
pub fn vertex_z_values(grid: &dyn Grid) -> Vec<f64> {
    grid.vertex_z_values()
}

/// Binds `coverage` to `grid` and fills component 0 with elevations from `z_values`.
///
/// Component 0 gets `no_data_value` as its sentinel. When the source returns a different
/// number of values than the grid has locations for the coverage's location kind, a warning
/// is logged and every location is set to `no_data_value`; this is not an error. Other
/// components are refilled with their defaults.
///
/// Fails with [`Error::Unsupported`], before anything is changed, when component 0 does not
/// hold doubles.
pub fn load_bathymetry<F>(
    coverage: &mut Coverage,
    grid: Arc<dyn Grid>,
    no_data_value: f64,
    z_values: F,
) -> Result<()>
where
    F: FnOnce(&dyn Grid) -> Vec<f64>,
{
    let mut sink = ();
    load_bathymetry_with_events(coverage, grid, no_data_value, z_values, &mut sink)
}

/// Same as [`load_bathymetry`], emitting events to `sink`.
pub fn load_bathymetry_with_events<F>(
    coverage: &mut Coverage,
    grid: Arc<dyn Grid>,
    no_data_value: f64,
    z_values: F,
    sink: &mut dyn EventSink,
) -> Result<()>
where
    F: FnOnce(&dyn Grid) -> Vec<f64>,
{
    match coverage.component(0) {
        Some(c) if c.is_double() => {}
        Some(c) => {
            return Err(Error::Unsupported(format!(
                "bathymetry component '{}' of coverage '{}' is not double-valued",
                c.name,
                coverage.name()
            )))
        }
        None => {
            return Err(Error::OutOfRange(format!(
                "coverage '{}' has no component to hold bathymetry",
                coverage.name()
            )))
        }
    }

    let mut session = coverage.begin_edit("Loading bathymetry", sink);

    let count = grid.location_count(session.coverage().location());
    session.reset_argument(count);
    session.set_no_data_value(0, no_data_value)?;

    let z = z_values(grid.as_ref());
    if z.len() == count {
        session.set_raw_values(0, z)?;
    } else {
        let message = format!(
            "Number of bathymetry values ({}) does not match the number of {} locations ({}); filling with no-data value {}.",
            z.len(),
            session.coverage().location(),
            count,
            no_data_value
        );
        warn!("Coverage '{}': {}", session.coverage().name(), message);
        session.warn(message);
        session.fill_component(0, no_data_value)?;
    }

    for i in 1..session.coverage().components().len() {
        session.fill_with_default(i)?;
    }
    session.set_grid(grid);
    Ok(())
}
