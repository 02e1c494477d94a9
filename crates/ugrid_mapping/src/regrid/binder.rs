//! Rebinding a coverage to a new grid, by reset or by reinterpolation.
use std::sync::Arc;

use tracing::{debug, info};

use crate::coverage::events::{CoverageEvent, CoverageEventKind, EventSink};
use crate::coverage::{Component, Coverage};
use crate::error::{Error, Result};
use crate::grid::{Grid, LocationKind};
use crate::interpolation::{InterpolationEngine, ProjectionKind, TargetGeometry};
use crate::pointcloud::to_point_cloud;

/// New contents of one component on the new grid.
#[derive(Debug)]
enum Refill {
    Uniform(f64),
    Values(Vec<f64>),
    Interpolated { values: Vec<f64>, samples: usize },
}

/// Moves coverages onto new grids using an interpolation engine.
#[derive(Clone, Copy)]
pub struct CoverageGridBinder<'a> {
    engine: &'a dyn InterpolationEngine,
}

impl<'a> CoverageGridBinder<'a> {
    pub fn new(engine: &'a dyn InterpolationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &'a dyn InterpolationEngine {
        self.engine
    }

    /// Rebinds `coverage` to `new_grid`.
    ///
    /// Does nothing when `new_grid` is the coverage's current grid. Otherwise the argument is
    /// rebuilt for the new location count and every component is refilled: with its default
    /// value when `reinterpolate` is false, or with values interpolated from the old field.
    /// Every refill is computed and length-checked against the new location count before the
    /// coverage is touched, so on error the coverage is left unchanged.
    pub fn load_grid(
        &self,
        coverage: &mut Coverage,
        new_grid: Arc<dyn Grid>,
        reinterpolate: bool,
    ) -> Result<()> {
        let mut sink = ();
        self.load_grid_with_events(coverage, new_grid, reinterpolate, &mut sink)
    }

    /// Same as [`load_grid`](Self::load_grid), emitting [`CoverageEvent`]s to `sink`.
    pub fn load_grid_with_events(
        &self,
        coverage: &mut Coverage,
        new_grid: Arc<dyn Grid>,
        reinterpolate: bool,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        if Arc::ptr_eq(coverage.grid(), &new_grid) {
            debug!("Coverage '{}' already uses this grid.", coverage.name());
            return Ok(());
        }

        let label = if reinterpolate {
            "Interpolating coverage onto new grid"
        } else {
            "Resetting coverage for new grid"
        };
        let mut session = coverage.begin_edit(label, sink);

        let location = session.coverage().location();
        let count = new_grid.location_count(location);

        let refills = if reinterpolate {
            self.interpolate_components(session.coverage(), new_grid.as_ref(), count)?
        } else {
            session
                .coverage()
                .components()
                .iter()
                .map(|c| Refill::Uniform(c.default_value))
                .collect()
        };

        session.reset_argument(count);
        for (i, refill) in refills.into_iter().enumerate() {
            match refill {
                Refill::Uniform(value) => session.fill_component(i, value)?,
                Refill::Values(values) => session.set_raw_values(i, values)?,
                Refill::Interpolated { values, samples } => {
                    session.set_raw_values(i, values)?;
                    if session.wants(CoverageEventKind::ComponentInterpolated) {
                        let name = session.coverage().name().to_owned();
                        session.emit(CoverageEvent::ComponentInterpolated {
                            coverage: name,
                            component: i,
                            samples,
                            targets: count,
                        });
                    }
                }
            }
        }
        session.set_grid(new_grid);

        info!(
            "Coverage '{}' bound to new grid | {} {} locations | reinterpolated: {}.",
            session.coverage().name(),
            count,
            location,
            reinterpolate,
        );
        Ok(())
    }

    fn interpolate_components(
        &self,
        coverage: &Coverage,
        new_grid: &dyn Grid,
        count: usize,
    ) -> Result<Vec<Refill>> {
        let location = coverage.location();
        let projection = ProjectionKind::for_grid(new_grid);
        let mut target: Option<TargetGeometry> = None;

        let mut refills = Vec::with_capacity(coverage.components().len());
        for (i, component) in coverage.components().iter().enumerate() {
            let refill = match shortcut(component, location, count) {
                Some(refill) => refill,
                None => {
                    let samples = to_point_cloud(coverage, i, true)?;
                    if samples.is_empty() {
                        debug!(
                            "Component '{}' of '{}' has no samples; using its default.",
                            component.name,
                            coverage.name()
                        );
                        Refill::Uniform(component.default_value)
                    } else {
                        let target = target
                            .get_or_insert_with(|| TargetGeometry::from_grid(new_grid, location));
                        if target.len() != count {
                            return Err(Error::data_consistency(
                                format!("target coordinates for '{}'", coverage.name()),
                                count,
                                target.len(),
                            ));
                        }
                        let values = self
                            .engine
                            .interpolate(&samples, target, location, projection)
                            .map_err(into_interpolation_error)?;
                        if values.len() != count {
                            return Err(Error::data_consistency(
                                format!("interpolated values for '{}'", coverage.name()),
                                count,
                                values.len(),
                            ));
                        }
                        debug!(
                            "Interpolated component '{}' of '{}' from {} samples.",
                            component.name,
                            coverage.name(),
                            samples.len()
                        );
                        Refill::Interpolated {
                            values: reorder(new_grid, location, values, count)?,
                            samples: samples.len(),
                        }
                    }
                }
            };
            refills.push(refill);
        }
        Ok(refills)
    }
}

impl std::fmt::Debug for CoverageGridBinder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageGridBinder").finish_non_exhaustive()
    }
}

/// Refills that need no engine call.
fn shortcut(component: &Component, location: LocationKind, count: usize) -> Option<Refill> {
    if !component.is_double() {
        return Some(Refill::Uniform(component.default_value));
    }
    if location == LocationKind::FlowLink && count == 0 {
        return Some(Refill::Values(Vec::new()));
    }
    component.uniform_value().map(Refill::Uniform)
}

fn reorder(
    grid: &dyn Grid,
    location: LocationKind,
    values: Vec<f64>,
    count: usize,
) -> Result<Vec<f64>> {
    if location != LocationKind::FlowLink {
        return Ok(values);
    }
    let values = grid.reorder_flow_link_values(&values);
    if values.len() != count {
        return Err(Error::data_consistency("reordered flow link values", count, values.len()));
    }
    Ok(values)
}

fn into_interpolation_error(e: Error) -> Error {
    match e {
        Error::Interpolation(_) => e,
        other => Error::Interpolation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::coverage::VecSink;
    use crate::grid::UnstructuredGrid;
    use crate::pointcloud::PointCloud;

    /// Returns the sample count at every target and counts calls.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl InterpolationEngine for Counting {
        fn interpolate(
            &self,
            samples: &PointCloud,
            target: &TargetGeometry,
            _location: LocationKind,
            _projection: ProjectionKind,
        ) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(vec![samples.len() as f64; target.len()])
        }
    }

    struct Failing;

    impl InterpolationEngine for Failing {
        fn interpolate(
            &self,
            _samples: &PointCloud,
            _target: &TargetGeometry,
            _location: LocationKind,
            _projection: ProjectionKind,
        ) -> Result<Vec<f64>> {
            Err(Error::Other("triangulation failed".into()))
        }
    }

    fn grid(nx: usize, ny: usize) -> Arc<dyn Grid> {
        Arc::new(UnstructuredGrid::regular(nx, ny, 1.0, 1.0))
    }

    #[test]
    fn same_grid_is_a_no_op() {
        let engine = Counting::default();
        let g = grid(2, 2);
        let mut coverage = Coverage::new("c", LocationKind::Cell, g.clone());
        let mut sink = VecSink::new();
        CoverageGridBinder::new(&engine)
            .load_grid_with_events(&mut coverage, g, true, &mut sink)
            .unwrap();
        assert!(sink.is_empty());
        assert_eq!(engine.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn reset_fills_default_not_no_data() {
        let engine = Counting::default();
        let mut coverage = Coverage::from_values(
            "c",
            LocationKind::Cell,
            grid(2, 2),
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
        .with_default_value(-1.0);
        CoverageGridBinder::new(&engine)
            .load_grid(&mut coverage, grid(3, 2), false)
            .unwrap();
        assert_eq!(coverage.argument(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(coverage.values(0).unwrap(), &[-1.0; 6]);
        assert_eq!(engine.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn non_uniform_component_goes_through_engine() {
        let engine = Counting::default();
        let mut coverage = Coverage::from_values(
            "c",
            LocationKind::Cell,
            grid(2, 1),
            vec![1.0, -999.0],
        )
        .unwrap();
        let new_grid = grid(3, 1);
        CoverageGridBinder::new(&engine)
            .load_grid(&mut coverage, new_grid.clone(), true)
            .unwrap();
        assert_eq!(engine.calls.load(Ordering::Relaxed), 1);
        // The no-data sample was skipped.
        assert_eq!(coverage.values(0).unwrap(), &[1.0; 3]);
        assert!(Arc::ptr_eq(coverage.grid(), &new_grid));
    }

    #[test]
    fn engine_failure_leaves_coverage_unchanged_and_closes_edit() {
        let mut coverage = Coverage::from_values(
            "c",
            LocationKind::Cell,
            grid(2, 1),
            vec![1.0, 2.0],
        )
        .unwrap();
        let old_grid = coverage.grid().clone();
        let mut sink = VecSink::new();
        let err = CoverageGridBinder::new(&Failing)
            .load_grid_with_events(&mut coverage, grid(4, 1), true, &mut sink)
            .unwrap_err();
        assert!(matches!(err, Error::Interpolation(_)));
        assert_eq!(coverage.values(0).unwrap(), &[1.0, 2.0]);
        assert!(Arc::ptr_eq(coverage.grid(), &old_grid));
        assert_eq!(sink.count(CoverageEventKind::EditStarted), 1);
        assert_eq!(sink.count(CoverageEventKind::EditFinished), 1);
        assert!(coverage.current_edit().is_none());
    }

    #[test]
    fn integer_components_keep_shape() {
        let engine = Counting::default();
        let mut coverage = Coverage::with_components(
            "c",
            LocationKind::Vertex,
            grid(1, 1),
            vec![
                Component::double("z", vec![0.0, 1.0, 2.0, 3.0]),
                Component::integer("flag", vec![1; 4]).with_default_value(7.0),
            ],
        )
        .unwrap();
        CoverageGridBinder::new(&engine)
            .load_grid(&mut coverage, grid(2, 1), true)
            .unwrap();
        assert_eq!(coverage.len(), 6);
        assert!(coverage.components().iter().all(|c| c.len() == 6));
        assert_eq!(
            coverage.component(1).unwrap().values,
            crate::coverage::ComponentValues::Integer(vec![7; 6])
        );
    }
}
