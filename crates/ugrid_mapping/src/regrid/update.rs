//! Deciding how each coverage of a model follows a grid replacement.
//!
//! After a model's grid is replaced, every coverage is either cleared (grid removed), loaded as
//! bathymetry (bed level without values), rebound through the [`CoverageGridBinder`]
//! (topology of its location kind changed), or simply pointed at the new grid.
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coverage::events::EventSink;
use crate::coverage::{Coverage, DEFAULT_NO_DATA_VALUE};
use crate::error::{Error, Result};
use crate::grid::{Grid, LocationKind, UnstructuredGrid};
use crate::interpolation::InterpolationEngine;
use crate::regrid::bathymetry::load_bathymetry_with_events;
use crate::regrid::binder::CoverageGridBinder;

/// Default name identifying the bathymetry coverage.
pub const DEFAULT_BATHYMETRY_NAME: &str = "Bed Level";

/// Which parts of the grid topology differ between the old and the new grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridChange {
    pub nodes_changed: bool,
    pub cells_changed: bool,
    pub links_changed: bool,
}

impl GridChange {
    /// Every location kind changed.
    pub fn all() -> Self {
        Self {
            nodes_changed: true,
            cells_changed: true,
            links_changed: true,
        }
    }

    /// Whether the locations of the given kind changed.
    pub fn affects(&self, location: LocationKind) -> bool {
        match location {
            LocationKind::Vertex => self.nodes_changed,
            LocationKind::Cell => self.cells_changed,
            LocationKind::FlowLink => self.links_changed,
        }
    }
}

/// Settings for [`GridUpdater`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct GridUpdateOptions {
    /// Name of the coverage loaded as bathymetry when it has no values.
    pub bathymetry_name: String,
    /// Sentinel written by the bathymetry loader.
    pub bathymetry_no_data_value: f64,
    /// Interpolate values onto changed topologies instead of resetting to defaults.
    pub reinterpolate: bool,
    /// Replace no-data entries with component defaults after each update.
    pub replace_missing_values: bool,
}

impl Default for GridUpdateOptions {
    fn default() -> Self {
        Self {
            bathymetry_name: DEFAULT_BATHYMETRY_NAME.into(),
            bathymetry_no_data_value: DEFAULT_NO_DATA_VALUE,
            reinterpolate: true,
            replace_missing_values: true,
        }
    }
}

impl GridUpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bathymetry_name(mut self, name: impl Into<String>) -> Self {
        self.bathymetry_name = name.into();
        self
    }

    pub fn with_bathymetry_no_data_value(mut self, no_data_value: f64) -> Self {
        self.bathymetry_no_data_value = no_data_value;
        self
    }

    pub fn with_reinterpolate(mut self, reinterpolate: bool) -> Self {
        self.reinterpolate = reinterpolate;
        self
    }

    pub fn with_replace_missing_values(mut self, replace: bool) -> Self {
        self.replace_missing_values = replace;
        self
    }

    /// Validates the options, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.bathymetry_name.trim().is_empty() {
            return Err(Error::Configuration("bathymetry_name must not be empty".into()));
        }
        if self.bathymetry_no_data_value.is_nan() {
            return Err(Error::Configuration(
                "bathymetry_no_data_value must not be NaN".into(),
            ));
        }
        Ok(())
    }
}

/// What [`GridUpdater::update_coverage_after_grid_set`] did to a coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridUpdateOutcome {
    /// The grid was removed; argument and components are empty.
    Cleared,
    /// Bathymetry was loaded from the elevation source.
    BathymetryLoaded,
    /// Rebound through the binder.
    Reloaded { reinterpolated: bool },
    /// Topology unchanged; only the grid reference was replaced.
    GridSwapped,
}

type BathymetrySource<'a> = Box<dyn Fn(&dyn Grid, LocationKind) -> Vec<f64> + Send + Sync + 'a>;

/// Elevation source used when none is configured: vertex z-values for vertex coverages,
/// nothing otherwise.
pub fn default_bathymetry_source(grid: &dyn Grid, location: LocationKind) -> Vec<f64> {
    match location {
        LocationKind::Vertex => grid.vertex_z_values(),
        LocationKind::Cell | LocationKind::FlowLink => Vec::new(),
    }
}

/// Applies a grid replacement to coverages.
pub struct GridUpdater<'a> {
    binder: CoverageGridBinder<'a>,
    options: GridUpdateOptions,
    bathymetry_source: BathymetrySource<'a>,
}

impl<'a> GridUpdater<'a> {
    pub fn new(engine: &'a dyn InterpolationEngine) -> Self {
        Self {
            binder: CoverageGridBinder::new(engine),
            options: GridUpdateOptions::default(),
            bathymetry_source: Box::new(default_bathymetry_source),
        }
    }

    /// Sets the options after validating them.
    pub fn with_options(mut self, options: GridUpdateOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Sets the elevation source used for bathymetry coverages, e.g. values read from a file.
    pub fn with_bathymetry_source(
        mut self,
        source: impl Fn(&dyn Grid, LocationKind) -> Vec<f64> + Send + Sync + 'a,
    ) -> Self {
        self.bathymetry_source = Box::new(source);
        self
    }

    pub fn options(&self) -> &GridUpdateOptions {
        &self.options
    }

    pub fn binder(&self) -> &CoverageGridBinder<'a> {
        &self.binder
    }

    /// Brings `coverage` in line with `new_grid`; `None` removes the grid.
    pub fn update_coverage_after_grid_set(
        &self,
        coverage: &mut Coverage,
        new_grid: Option<Arc<dyn Grid>>,
        change: GridChange,
    ) -> Result<GridUpdateOutcome> {
        let mut sink = ();
        self.update_coverage_after_grid_set_with_events(coverage, new_grid, change, &mut sink)
    }

    /// Same as [`update_coverage_after_grid_set`](Self::update_coverage_after_grid_set),
    /// emitting events to `sink`.
    pub fn update_coverage_after_grid_set_with_events(
        &self,
        coverage: &mut Coverage,
        new_grid: Option<Arc<dyn Grid>>,
        change: GridChange,
        sink: &mut dyn EventSink,
    ) -> Result<GridUpdateOutcome> {
        let Some(new_grid) = new_grid else {
            let mut session = coverage.begin_edit("Clearing grid from coverage", sink);
            session.clear();
            session.set_grid(Arc::new(UnstructuredGrid::empty()));
            debug!("Cleared grid from coverage '{}'.", session.coverage().name());
            return Ok(GridUpdateOutcome::Cleared);
        };

        let outcome = if self.is_empty_bathymetry(coverage) {
            let location = coverage.location();
            load_bathymetry_with_events(
                coverage,
                new_grid,
                self.options.bathymetry_no_data_value,
                |grid| (self.bathymetry_source)(grid, location),
                sink,
            )?;
            GridUpdateOutcome::BathymetryLoaded
        } else if self.topology_changed(coverage, new_grid.as_ref(), change) {
            let reinterpolate = self.options.reinterpolate;
            self.binder
                .load_grid_with_events(coverage, new_grid, reinterpolate, sink)?;
            GridUpdateOutcome::Reloaded { reinterpolated: reinterpolate }
        } else {
            let mut session = coverage.begin_edit("Replacing grid", sink);
            session.set_grid(new_grid);
            GridUpdateOutcome::GridSwapped
        };

        if self.options.replace_missing_values {
            let replaced = coverage.replace_missing_values_with_default_values();
            if replaced > 0 {
                debug!(
                    "Replaced {} missing values with defaults in coverage '{}'.",
                    replaced,
                    coverage.name()
                );
            }
        }
        Ok(outcome)
    }

    fn is_empty_bathymetry(&self, coverage: &Coverage) -> bool {
        coverage.name() == self.options.bathymetry_name
            && coverage.values(0).is_none_or(<[f64]>::is_empty)
    }

    fn topology_changed(&self, coverage: &Coverage, new_grid: &dyn Grid, change: GridChange) -> bool {
        if change.affects(coverage.location()) {
            return true;
        }
        let count = new_grid.location_count(coverage.location());
        if count != coverage.len() {
            warn!(
                "Coverage '{}' has {} values but the new grid has {} {} locations; reloading.",
                coverage.name(),
                coverage.len(),
                count,
                coverage.location()
            );
            return true;
        }
        false
    }
}

impl std::fmt::Debug for GridUpdater<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridUpdater")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Applies a grid replacement to one coverage with the given options and engine.
///
/// Shorthand for a [`GridUpdater`] with the default bathymetry source.
pub fn update_coverage_after_grid_set(
    coverage: &mut Coverage,
    new_grid: Option<Arc<dyn Grid>>,
    change: GridChange,
    options: &GridUpdateOptions,
    engine: &dyn InterpolationEngine,
) -> Result<GridUpdateOutcome> {
    GridUpdater::new(engine)
        .with_options(options.clone())?
        .update_coverage_after_grid_set(coverage, new_grid, change)
}
